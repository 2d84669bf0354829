//! Swap domain module: converting the bridged stablecoin into VET.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Conversion request sent to the swap service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub usdc_amount: f64,
    pub deposit_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_bps: Option<u32>,
}

/// Swap receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub tx_hash: String,
    /// Native asset received; this is the amount forwarded to staking.
    pub vet_amount: String,
    pub minimum_received: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
    pub usdc_token: String,
    pub vet_token: String,
}

#[async_trait]
pub trait SwapClient: Send + Sync {
    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_parses_without_quote_id() {
        let response: ConversionResponse = serde_json::from_value(json!({
            "txHash": "0xSWAP",
            "vetAmount": "4.75",
            "minimumReceived": "4.7",
            "usdcToken": "U",
            "vetToken": "VET"
        }))
        .unwrap();
        assert_eq!(response.vet_amount, "4.75");
        assert_eq!(response.quote_id, None);
    }
}
