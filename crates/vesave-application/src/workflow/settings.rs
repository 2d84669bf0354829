use vesave_core::bridge::BridgeRoute;
use vesave_core::config::RootConfig;

/// Fixed per-deployment inputs of every run.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    pub route: BridgeRoute,
    /// Applied to the swap when the caller leaves slippage unset.
    pub default_slippage_bps: u32,
    pub stake_dst_chain_id: Option<u32>,
    pub stake_pool_id: Option<u32>,
}

impl WorkflowSettings {
    pub fn from_config(config: &RootConfig) -> Self {
        Self {
            route: config.bridge.route(),
            default_slippage_bps: config.workflow.default_slippage_bps,
            stake_dst_chain_id: config.stake.dst_chain_id,
            stake_pool_id: config.stake.pool_id,
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self::from_config(&RootConfig::default())
    }
}
