use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use vesave_execution::{LogFormat, init_tracing};
use vesave_infrastructure::{ConfigService, InMemoryWalletStore};
use vesave_core::bridge::BridgeTxSubmitter;
use vesave_interaction::{EvmBridgeSubmitter, WanBridgeGateway};
use vesave_server::{AppState, app_router, spawn_session_pruner};

#[derive(Parser, Debug)]
#[command(name = "vesave-server")]
#[command(about = "veSave backend: session wallets and bridge proxy", long_about = None)]
struct Args {
    /// Path to config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides server.bind
    #[arg(long)]
    bind: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(format, "info", None)?;

    let config_service = match args.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };
    let mut config = config_service.get_config()?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    config.validate_server()?;
    for warning in config.warnings() {
        tracing::warn!("[Server] {}", warning);
    }

    let store = Arc::new(InMemoryWalletStore::new());
    let gateway = Arc::new(WanBridgeGateway::from_config(&config.server));
    let submitter: Option<Arc<dyn BridgeTxSubmitter>> =
        if config.server.source_rpc_url.trim().is_empty() {
            tracing::warn!("[Server] server.source_rpc_url is empty; bridge creation is disabled");
            None
        } else {
            Some(Arc::new(EvmBridgeSubmitter::new(&config.server.source_rpc_url)?))
        };
    let state = AppState::new(&config, store.clone(), gateway).with_submitter(submitter);

    let _pruner = spawn_session_pruner(
        store,
        Duration::from_secs(config.server.session_ttl_secs),
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!(
        "[Server] Listening on {} (WanBridge {})",
        config.server.bind,
        config.server.wanbridge_api_base
    );

    axum::serve(listener, app_router(state)).await?;
    Ok(())
}
