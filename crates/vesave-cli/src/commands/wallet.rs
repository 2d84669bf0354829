use anyhow::Result;
use colored::Colorize;
use vesave_core::address::shorten_address;
use vesave_core::session::WalletSession;

use super::CliContext;

pub async fn create(ctx: &CliContext) -> Result<()> {
    let runner = ctx.runner()?;
    let session = runner.sessions().create_wallet().await?;
    ctx.session_file.save(&session)?;

    println!("{}", "Session wallet created".bright_green());
    print_session(&session);
    println!(
        "{}",
        "Fund the Ethereum deposit address with USDC, then run `vesave run --amount <USDC>`."
            .bright_black()
    );
    Ok(())
}

pub fn show(ctx: &CliContext) -> Result<()> {
    match ctx.session_file.load()? {
        Some(session) => print_session(&session),
        None => println!(
            "{}",
            "No session wallet. Run `vesave wallet create` first.".yellow()
        ),
    }
    Ok(())
}

pub async fn reset(ctx: &CliContext) -> Result<()> {
    let runner = ctx.runner()?;
    let removed = runner.sessions().reset_wallet().await;
    ctx.session_file.clear()?;

    match removed {
        Some(session) => println!(
            "{}",
            format!("Session {} reset", session.session_id).bright_green()
        ),
        None => println!("{}", "No session wallet to reset.".bright_black()),
    }
    Ok(())
}

fn print_session(session: &WalletSession) {
    println!("  {} {}", "Session: ".bright_black(), session.session_id);
    println!(
        "  {} {} ({})",
        "Ethereum:".bright_black(),
        session.source_address,
        shorten_address(Some(&session.source_address), 4)
    );
    println!(
        "  {} {} ({})",
        "VeChain: ".bright_black(),
        session.dest_address,
        shorten_address(Some(&session.dest_address), 4)
    );
}
