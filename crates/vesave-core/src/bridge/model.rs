//! Cross-chain transfer request and receipt types.

use serde::{Deserialize, Serialize};

use super::tx::BridgeTxData;
use crate::error::{Result, VeSaveError};

/// Transfer parameters forwarded to the hosted bridge API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeTransferPayload {
    pub from_chain: String,
    pub to_chain: String,
    pub from_account: String,
    pub to_account: String,
    /// Decimal amount of the source token, as entered.
    pub amount: String,
    pub from_token: String,
    pub to_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner: Option<String>,
    /// Pre-built source-chain call, used when the bridge response carries none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_data: Option<BridgeTxData>,
}

/// Fixed chain and token identifiers for one bridge direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeRoute {
    pub from_chain: String,
    pub to_chain: String,
    pub from_token: String,
    pub to_token: String,
    pub partner: Option<String>,
}

impl BridgeRoute {
    /// Builds the transfer payload for moving `amount` between two accounts.
    pub fn payload(
        &self,
        from_account: &str,
        to_account: &str,
        amount: f64,
    ) -> BridgeTransferPayload {
        BridgeTransferPayload {
            from_chain: self.from_chain.clone(),
            to_chain: self.to_chain.clone(),
            from_account: from_account.to_string(),
            to_account: to_account.to_string(),
            amount: amount.to_string(),
            from_token: self.from_token.clone(),
            to_token: self.to_token.clone(),
            partner: self.partner.clone().filter(|tag| !tag.trim().is_empty()),
            tx_data: None,
        }
    }
}

/// Bridge submission bound to a session wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeTransferRequest {
    pub session_id: String,
    pub payload: BridgeTransferPayload,
}

/// Receipt of a submitted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeTransferResponse {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

/// A task created upstream, with the source-chain call that funds it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BridgeTaskCreated {
    pub task_id: Option<String>,
    pub tx_data: Option<BridgeTxData>,
}

/// Task ids become a URL path segment upstream; only `[A-Za-z0-9_-]` is allowed.
pub fn validate_task_id(task_id: &str) -> Result<()> {
    let valid = !task_id.is_empty()
        && task_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(VeSaveError::invalid_input(format!(
            "Invalid bridge task id '{}'.",
            task_id
        )))
    }
}

/// Progress reported by the bridge for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeTaskState {
    Pending,
    Confirming,
    Completed,
    Failed,
}

impl BridgeTaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeTransferStatus {
    pub status: BridgeTaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
