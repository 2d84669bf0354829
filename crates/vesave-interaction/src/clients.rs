//! Client-set construction.
//!
//! The live/simulated decision is made exactly once here; the orchestrator
//! only ever sees trait objects.

use std::sync::Arc;
use vesave_core::Result;
use vesave_core::bridge::BridgeClient;
use vesave_core::config::{ClientMode, RootConfig};
use vesave_core::session::WalletService;
use vesave_core::stake::StakeClient;
use vesave_core::swap::SwapClient;

use crate::backend::{HttpBridgeClient, HttpStakeClient, HttpSwapClient, HttpWalletService};
use crate::simulated::{
    SimulatedBridgeClient, SimulatedStakeClient, SimulatedWalletService, swap_from_config,
};

/// Every outbound dependency of a workflow run.
#[derive(Clone)]
pub struct WorkflowClients {
    pub mode: ClientMode,
    pub wallet: Arc<dyn WalletService>,
    pub bridge: Arc<dyn BridgeClient>,
    pub swap: Arc<dyn SwapClient>,
    pub stake: Arc<dyn StakeClient>,
}

impl WorkflowClients {
    /// Builds the client set for the configured mode.
    pub fn from_config(config: &RootConfig) -> Result<Self> {
        config.validate()?;
        for warning in config.warnings() {
            tracing::warn!("[WorkflowClients] {}", warning);
        }

        let clients = match config.mode {
            ClientMode::Live => {
                let base = config.backend.api_base.trim().to_string();
                tracing::info!("[WorkflowClients] Live mode against {}", base);
                Self {
                    mode: ClientMode::Live,
                    wallet: Arc::new(HttpWalletService::new(base.clone())),
                    bridge: Arc::new(HttpBridgeClient::new(base.clone())),
                    swap: Arc::new(HttpSwapClient::new(base.clone())),
                    stake: Arc::new(HttpStakeClient::new(base)),
                }
            }
            ClientMode::Simulated => {
                tracing::warn!(
                    "[WorkflowClients] Simulated mode: bridge, swap and stake responses are synthesized locally"
                );
                Self {
                    mode: ClientMode::Simulated,
                    wallet: Arc::new(SimulatedWalletService::default()),
                    bridge: Arc::new(SimulatedBridgeClient),
                    swap: Arc::new(swap_from_config(config)),
                    stake: Arc::new(SimulatedStakeClient::new(
                        config.stake.router_address.clone(),
                    )),
                }
            }
        };

        Ok(clients)
    }
}

impl std::fmt::Debug for WorkflowClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowClients")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
