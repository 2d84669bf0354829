use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::CliContext;

#[derive(Parser)]
#[command(name = "vesave")]
#[command(about = "veSave CLI - bridge, swap and stake from a session wallet", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to ~/.config/vesave/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the session wallet
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
    /// Run bridge → swap → stake for the session wallet
    Run {
        /// USDC amount to bridge
        #[arg(long)]
        amount: f64,

        /// Swap slippage in basis points
        #[arg(long)]
        slippage_bps: Option<u32>,
    },
    /// Query the status of a bridge task
    BridgeStatus {
        task_id: String,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum WalletAction {
    /// Create a new session wallet, replacing the current one
    Create,
    /// Show the current session wallet
    Show,
    /// Delete the current session wallet
    Reset,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (ctx, events) = CliContext::init(cli.config, cli.json_logs)?;

    match cli.command {
        Commands::Wallet { action } => match action {
            WalletAction::Create => commands::wallet::create(&ctx).await?,
            WalletAction::Show => commands::wallet::show(&ctx)?,
            WalletAction::Reset => commands::wallet::reset(&ctx).await?,
        },
        Commands::Run {
            amount,
            slippage_bps,
        } => commands::run::execute(&ctx, events, amount, slippage_bps).await?,
        Commands::BridgeStatus { task_id } => commands::bridge::status(&ctx, &task_id).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&ctx)?,
        },
    }

    Ok(())
}
