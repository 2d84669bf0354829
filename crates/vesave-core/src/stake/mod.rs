//! Stake domain module: depositing VET into the yield pool.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Decimal VET amount as reported by the swap stage.
    pub vet_amount: String,
    pub deposit_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_chain_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeResponse {
    pub tx_hash: String,
    pub router_address: String,
}

#[async_trait]
pub trait StakeClient: Send + Sync {
    async fn stake(&self, request: &StakeRequest) -> Result<StakeResponse>;
}
