//! Workflow inputs and the observable per-run state.

use serde::{Deserialize, Serialize};

use super::status::WorkflowStatuses;
use crate::bridge::BridgeTransferResponse;
use crate::session::WalletSession;
use crate::stake::StakeResponse;
use crate::swap::ConversionResponse;

/// What the user submits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInput {
    pub usdc_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_bps: Option<u32>,
}

impl WorkflowInput {
    pub fn new(usdc_amount: f64) -> Self {
        Self {
            usdc_amount,
            slippage_bps: None,
        }
    }

    pub fn with_slippage_bps(mut self, slippage_bps: u32) -> Self {
        self.slippage_bps = Some(slippage_bps);
        self
    }
}

/// Fully resolved parameters for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowParams {
    pub session_id: String,
    pub usdc_amount: f64,
    pub source_address: String,
    pub dest_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_bps: Option<u32>,
}

impl WorkflowParams {
    pub fn from_session(session: &WalletSession, input: WorkflowInput) -> Self {
        Self {
            session_id: session.session_id.clone(),
            usdc_amount: input.usdc_amount,
            source_address: session.source_address.clone(),
            dest_address: session.dest_address.clone(),
            slippage_bps: input.slippage_bps,
        }
    }
}

/// Everything a UI needs to render the three-step status list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    /// Token of the run that last wrote this state.
    pub run_id: u64,
    pub statuses: WorkflowStatuses,
    pub is_running: bool,
    /// Most recent failure message.
    pub error: Option<String>,
    pub last_bridge: Option<BridgeTransferResponse>,
    pub last_swap: Option<ConversionResponse>,
    pub last_stake: Option<StakeResponse>,
}

impl WorkflowSnapshot {
    /// Whether every observable slot is at its reset value.
    pub fn is_cleared(&self) -> bool {
        self.statuses.all_idle()
            && !self.is_running
            && self.error.is_none()
            && self.last_bridge.is_none()
            && self.last_swap.is_none()
            && self.last_stake.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_copy_session_addresses() {
        let session = WalletSession::new("s", "0xE", "0xV");
        let params = WorkflowParams::from_session(&session, WorkflowInput::new(5.0));
        assert_eq!(params.source_address, "0xE");
        assert_eq!(params.dest_address, "0xV");
        assert_eq!(params.slippage_bps, None);
    }

    #[test]
    fn default_snapshot_is_cleared() {
        assert!(WorkflowSnapshot::default().is_cleared());
    }
}
