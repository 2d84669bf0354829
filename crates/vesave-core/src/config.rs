//! Configuration model.
//!
//! Every section has defaults matching the Sepolia → VeChain testnet
//! deployment, so an empty `config.toml` is a valid simulated setup once
//! `mode = "simulated"` is set.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::address::{ZERO_ADDRESS, is_valid_address, is_zero_address};
use crate::bridge::BridgeRoute;
use crate::error::{Result, VeSaveError};
use crate::workflow::DEFAULT_SLIPPAGE_BPS;

pub const DEFAULT_FROM_CHAIN: &str = "ETH";
pub const DEFAULT_TO_CHAIN: &str = "VET";
pub const SEPOLIA_USDC_ADDRESS: &str = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238";
pub const VECHAIN_TESTNET_USDC_ADDRESS: &str = "0xAf9555d393212F82A74d892139a4F5D349a8F3f6";
/// VET is the chain's native asset and has no contract address.
pub const VECHAIN_NATIVE_TOKEN: &str = "VET";

/// How outbound clients are built. Resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClientMode {
    /// Talk to the configured backend.
    #[default]
    Live,
    /// Synthesize responses locally; no network calls.
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the veSave backend, including the `/api` prefix.
    pub api_base: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub from_chain: String,
    pub to_chain: String,
    pub from_token: String,
    pub to_token: String,
    pub partner: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            from_chain: DEFAULT_FROM_CHAIN.to_string(),
            to_chain: DEFAULT_TO_CHAIN.to_string(),
            from_token: SEPOLIA_USDC_ADDRESS.to_string(),
            to_token: VECHAIN_TESTNET_USDC_ADDRESS.to_string(),
            partner: None,
        }
    }
}

impl BridgeConfig {
    pub fn route(&self) -> BridgeRoute {
        BridgeRoute {
            from_chain: self.from_chain.clone(),
            to_chain: self.to_chain.clone(),
            from_token: self.from_token.clone(),
            to_token: self.to_token.clone(),
            partner: self.partner.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub default_slippage_bps: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_slippage_bps: DEFAULT_SLIPPAGE_BPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakeConfig {
    pub router_address: String,
    pub dst_chain_id: Option<u32>,
    pub pool_id: Option<u32>,
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self {
            router_address: ZERO_ADDRESS.to_string(),
            dst_chain_id: None,
            pool_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub vet_per_usdc: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { vet_per_usdc: 0.95 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub source_tx_base: String,
    pub dest_tx_base: String,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            source_tx_base: "https://sepolia.etherscan.io/tx".to_string(),
            dest_tx_base: "https://explore-testnet.vechain.org/transactions".to_string(),
        }
    }
}

impl ExplorerConfig {
    pub fn source_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/{}", self.source_tx_base.trim_end_matches('/'), tx_hash)
    }

    pub fn dest_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/{}", self.dest_tx_base.trim_end_matches('/'), tx_hash)
    }
}

/// Settings of the companion backend server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub wanbridge_api_base: String,
    pub wanbridge_create_path: String,
    pub wanbridge_status_base: String,
    /// JSON-RPC endpoint of the source chain. Bridge creation is refused
    /// while this is empty.
    pub source_rpc_url: String,
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
    pub session_ttl_secs: u64,
    pub vet_per_usdc: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:4000".to_string(),
            wanbridge_api_base: "https://bridge-api.wanchain.org/api/testnet".to_string(),
            wanbridge_create_path: "/createTx2".to_string(),
            wanbridge_status_base: "https://bridge-api.wanchain.org/api/status".to_string(),
            source_rpc_url: String::new(),
            allowed_origins: Vec::new(),
            session_ttl_secs: 3600,
            vet_per_usdc: 1.0,
        }
    }
}

/// Root of `config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    pub mode: ClientMode,
    pub backend: BackendConfig,
    pub bridge: BridgeConfig,
    pub workflow: WorkflowConfig,
    pub stake: StakeConfig,
    pub simulation: SimulationConfig,
    pub explorer: ExplorerConfig,
    pub server: ServerConfig,
}

impl RootConfig {
    /// Rejects configurations that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.mode == ClientMode::Live && self.backend.api_base.trim().is_empty() {
            return Err(VeSaveError::config(
                "backend.api_base must be set in live mode; set mode = \"simulated\" for local runs",
            ));
        }

        for (field, address) in [
            ("bridge.from_token", &self.bridge.from_token),
            ("bridge.to_token", &self.bridge.to_token),
            ("stake.router_address", &self.stake.router_address),
        ] {
            if !is_valid_address(address) {
                return Err(VeSaveError::config(format!(
                    "{} is not a valid address: '{}'",
                    field, address
                )));
            }
        }

        if self.workflow.default_slippage_bps > 10_000 {
            return Err(VeSaveError::config(
                "workflow.default_slippage_bps must not exceed 10000",
            ));
        }

        if !(self.simulation.vet_per_usdc.is_finite() && self.simulation.vet_per_usdc > 0.0) {
            return Err(VeSaveError::config("simulation.vet_per_usdc must be positive"));
        }

        Ok(())
    }

    /// Non-fatal problems worth logging at startup.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if is_zero_address(&self.stake.router_address) {
            warnings.push(
                "stake.router_address is the zero address; staking transactions will fail"
                    .to_string(),
            );
        }
        warnings
    }

    /// Checks the sections the backend server relies on.
    pub fn validate_server(&self) -> Result<()> {
        let server = &self.server;
        if server.bind.trim().is_empty() {
            return Err(VeSaveError::config("server.bind must not be empty"));
        }
        if server.wanbridge_api_base.trim().is_empty()
            || server.wanbridge_status_base.trim().is_empty()
        {
            return Err(VeSaveError::config(
                "server.wanbridge_api_base and server.wanbridge_status_base must be set",
            ));
        }
        if !server.wanbridge_create_path.starts_with('/') {
            return Err(VeSaveError::config(
                "server.wanbridge_create_path must start with '/'",
            ));
        }
        if server.session_ttl_secs == 0 {
            return Err(VeSaveError::config("server.session_ttl_secs must be positive"));
        }
        if !(server.vet_per_usdc.is_finite() && server.vet_per_usdc > 0.0) {
            return Err(VeSaveError::config("server.vet_per_usdc must be positive"));
        }
        if !is_valid_address(&self.stake.router_address) {
            return Err(VeSaveError::config(format!(
                "stake.router_address is not a valid address: '{}'",
                self.stake.router_address
            )));
        }
        Ok(())
    }
}
