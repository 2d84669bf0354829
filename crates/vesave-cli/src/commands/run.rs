use anyhow::{Result, bail};
use colored::Colorize;
use tokio::sync::mpsc;
use vesave_core::config::ExplorerConfig;
use vesave_core::workflow::{Stage, StepStatus, WorkflowInput, WorkflowSnapshot};
use vesave_execution::WorkflowEvent;

use super::CliContext;

pub async fn execute(
    ctx: &CliContext,
    mut events: mpsc::UnboundedReceiver<WorkflowEvent>,
    amount: f64,
    slippage_bps: Option<u32>,
) -> Result<()> {
    let runner = ctx.runner()?;
    let mut input = WorkflowInput::new(amount);
    if let Some(bps) = slippage_bps {
        input = input.with_slippage_bps(bps);
    }

    println!(
        "{} {} USDC ({} mode)",
        "Starting workflow for".bright_cyan(),
        amount,
        runner.mode()
    );

    let run = runner.run(input);
    tokio::pin!(run);

    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            Some(event) = events.recv() => print_event(&event),
        }
    };
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }

    let snapshot = runner.orchestrator().snapshot();
    println!();
    print_summary(&snapshot, &ctx.config.explorer);

    match result {
        Ok(_) => {
            println!("{}", "Workflow completed".bright_green());
            Ok(())
        }
        Err(err) => bail!("Workflow failed: {}", err),
    }
}

fn print_event(event: &WorkflowEvent) {
    let (Some(stage), Some(status)) = (event.stage, event.status) else {
        if event.level == "WARN" || event.level == "ERROR" {
            println!("  {}", event.message.yellow());
        }
        return;
    };

    let line = format!("  [{}] {}", stage, status);
    match status {
        StepStatus::Pending => println!("{}", line.yellow()),
        StepStatus::Success => println!("{}", line.green()),
        StepStatus::Error => {
            let reason = event.error.as_deref().unwrap_or(&event.message);
            println!("{} {}", line.red(), reason.red());
        }
        StepStatus::Idle => println!("{}", line.bright_black()),
    }
}

fn print_summary(snapshot: &WorkflowSnapshot, explorer: &ExplorerConfig) {
    for stage in [Stage::Bridge, Stage::Swap, Stage::Stake] {
        let status = snapshot.statuses.get(stage);
        let label = match status {
            StepStatus::Success => status.to_string().green(),
            StepStatus::Error => status.to_string().red(),
            StepStatus::Pending => status.to_string().yellow(),
            StepStatus::Idle => status.to_string().bright_black(),
        };
        println!("  {:<7} {}", stage.to_string(), label);
    }

    if let Some(bridge) = &snapshot.last_bridge {
        if let Some(task_id) = &bridge.task_id {
            println!("  {} {}", "Bridge task:".bright_black(), task_id);
        }
        if let Some(tx_hash) = &bridge.tx_hash {
            println!("  {} {}", "Bridge tx:  ".bright_black(), explorer.source_tx_url(tx_hash));
        }
    }
    if let Some(swap) = &snapshot.last_swap {
        println!(
            "  {} {} VET (min {})",
            "Swapped:    ".bright_black(),
            swap.vet_amount,
            swap.minimum_received
        );
        println!("  {} {}", "Swap tx:    ".bright_black(), explorer.dest_tx_url(&swap.tx_hash));
    }
    if let Some(stake) = &snapshot.last_stake {
        println!("  {} {}", "Stake tx:   ".bright_black(), explorer.dest_tx_url(&stake.tx_hash));
    }
    if let Some(error) = &snapshot.error {
        println!("  {} {}", "Error:".red(), error);
    }
}
