use anyhow::Result;
use colored::Colorize;
use vesave_core::bridge::BridgeTaskState;

use super::CliContext;

pub async fn status(ctx: &CliContext, task_id: &str) -> Result<()> {
    let runner = ctx.runner()?;
    let status = runner.bridge_status(task_id).await?;

    let label = format!("{:?}", status.status).to_lowercase();
    let label = match status.status {
        BridgeTaskState::Completed => label.bright_green(),
        BridgeTaskState::Failed => label.red(),
        BridgeTaskState::Pending | BridgeTaskState::Confirming => label.yellow(),
    };
    println!("Task {}: {}", task_id, label);

    if let Some(tx_hash) = &status.tx_hash {
        println!("  tx: {}", tx_hash);
        if status.status == BridgeTaskState::Completed {
            println!("  {}", ctx.config.explorer.dest_tx_url(tx_hash).bright_blue());
        }
    }
    if let Some(reason) = &status.reason {
        println!("  reason: {}", reason);
    }
    Ok(())
}
