use std::sync::Arc;
use vesave_core::bridge::{BridgeGateway, BridgeTxSubmitter};
use vesave_core::config::{RootConfig, ServerConfig};
use vesave_core::session::WalletStore;

/// Shared handler state. Cloning shares the store and the gateway.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WalletStore>,
    pub gateway: Arc<dyn BridgeGateway>,
    /// Absent when no source-chain endpoint is configured.
    pub submitter: Option<Arc<dyn BridgeTxSubmitter>>,
    pub server: Arc<ServerConfig>,
    /// Router reported by the stake endpoint.
    pub stake_router: String,
    /// Token the conversion endpoint quotes from.
    pub usdc_token: String,
}

impl AppState {
    pub fn new(
        config: &RootConfig,
        store: Arc<dyn WalletStore>,
        gateway: Arc<dyn BridgeGateway>,
    ) -> Self {
        Self {
            store,
            gateway,
            submitter: None,
            server: Arc::new(config.server.clone()),
            stake_router: config.stake.router_address.clone(),
            usdc_token: config.bridge.to_token.clone(),
        }
    }

    pub fn with_submitter(mut self, submitter: Option<Arc<dyn BridgeTxSubmitter>>) -> Self {
        self.submitter = submitter;
        self
    }
}
