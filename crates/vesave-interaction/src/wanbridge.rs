//! Upstream WanBridge API, used by the backend server.

use async_trait::async_trait;
use serde_json::Value;
use vesave_core::bridge::{
    BridgeGateway, BridgeTaskCreated, BridgeTaskState, BridgeTransferPayload,
    BridgeTransferStatus, BridgeTxData, validate_task_id,
};
use vesave_core::config::ServerConfig;
use vesave_core::{Result, VeSaveError};

use crate::http::JsonHttp;

/// Creates transfer tasks and reads task status from the hosted bridge.
#[derive(Debug, Clone)]
pub struct WanBridgeGateway {
    api: JsonHttp,
    status: JsonHttp,
    create_path: String,
}

impl WanBridgeGateway {
    pub fn new(
        api_base: impl Into<String>,
        create_path: impl Into<String>,
        status_base: impl Into<String>,
    ) -> Self {
        Self {
            api: JsonHttp::new(api_base),
            status: JsonHttp::new(status_base),
            create_path: create_path.into(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.wanbridge_api_base.clone(),
            config.wanbridge_create_path.clone(),
            config.wanbridge_status_base.clone(),
        )
    }
}

#[async_trait]
impl BridgeGateway for WanBridgeGateway {
    async fn create_transfer(&self, payload: &BridgeTransferPayload) -> Result<BridgeTaskCreated> {
        let body: Value = self.api.post_json(&self.create_path, payload).await?;
        let created = parse_create_response(&body)?;
        tracing::info!(
            task_id = created.task_id.as_deref().unwrap_or("-"),
            "[WanBridge] Created transfer {} {} -> {}",
            payload.amount,
            payload.from_chain,
            payload.to_chain
        );
        Ok(created)
    }

    async fn transfer_status(&self, task_id: &str) -> Result<BridgeTransferStatus> {
        validate_task_id(task_id)?;
        let body: Value = self.status.get_json(&format!("/{}", task_id)).await?;
        parse_status_response(&body)
    }

    fn api_base(&self) -> &str {
        self.api.base()
    }
}

/// The bridge wraps results in `data` on some endpoints and not on others.
fn payload_of(body: &Value) -> &Value {
    match body.get("data") {
        Some(data) if data.is_object() => data,
        _ => body,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_create_response(body: &Value) -> Result<BridgeTaskCreated> {
    let data = payload_of(body);
    let tx_data = match data.get("txData").or_else(|| data.get("tx")) {
        Some(tx) if tx.is_object() => Some(
            serde_json::from_value::<BridgeTxData>(tx.clone()).map_err(|e| {
                VeSaveError::upstream(format!("Bridge returned an unusable transaction: {}", e))
            })?,
        ),
        _ => None,
    };
    Ok(BridgeTaskCreated {
        task_id: string_field(data, "taskId").or_else(|| string_field(body, "taskId")),
        tx_data,
    })
}

fn parse_status_response(body: &Value) -> Result<BridgeTransferStatus> {
    let data = payload_of(body);
    let raw = string_field(data, "status")
        .ok_or_else(|| VeSaveError::upstream("Bridge status response has no status field."))?;
    let status = match raw.to_ascii_lowercase().as_str() {
        "pending" => BridgeTaskState::Pending,
        "confirming" | "processing" => BridgeTaskState::Confirming,
        "completed" | "success" | "succeeded" => BridgeTaskState::Completed,
        "failed" | "error" | "refund" | "refunded" => BridgeTaskState::Failed,
        other => {
            return Err(VeSaveError::upstream(format!(
                "Unrecognised bridge status '{}'.",
                other
            )));
        }
    };
    Ok(BridgeTransferStatus {
        status,
        tx_hash: string_field(data, "txHash"),
        reason: string_field(data, "reason"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_response_reads_nested_or_flat_fields() {
        let nested = parse_create_response(&json!({ "data": { "taskId": "T1" } })).unwrap();
        assert_eq!(nested.task_id.as_deref(), Some("T1"));
        assert_eq!(nested.tx_data, None);

        let flat = parse_create_response(&json!({ "taskId": 42 })).unwrap();
        assert_eq!(flat.task_id.as_deref(), Some("42"));
    }

    #[test]
    fn create_response_carries_the_transaction_to_sign() {
        let created = parse_create_response(&json!({
            "success": true,
            "data": {
                "taskId": "T2",
                "tx": {
                    "to": "0xBridge",
                    "data": "0x01",
                    "value": "0x0",
                    "approveAmount": "5000000"
                }
            }
        }))
        .unwrap();
        let tx = created.tx_data.unwrap();
        assert_eq!(tx.contract_address, "0xBridge");
        assert_eq!(tx.approve_amount.map(|q| q.value()), Some(5_000_000));

        let err = parse_create_response(&json!({
            "data": { "txData": { "to": "0xB", "gas": "many" } }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unusable transaction"));
    }

    #[tokio::test]
    async fn status_lookup_rejects_unsafe_task_ids() {
        // Nothing listens on this port; a valid id would fail with a transport error.
        let gateway = WanBridgeGateway::new(
            "http://127.0.0.1:9",
            "/createTx2",
            "http://127.0.0.1:9/status",
        );
        for bad in ["../../admin", "T1?limit=0", "a/b", ""] {
            let err = gateway.transfer_status(bad).await.unwrap_err();
            assert!(matches!(err, VeSaveError::InvalidInput(_)), "{bad}");
        }
    }

    #[test]
    fn status_response_maps_known_states() {
        let status =
            parse_status_response(&json!({ "data": { "status": "Success", "txHash": "0x1" } }))
                .unwrap();
        assert_eq!(status.status, BridgeTaskState::Completed);
        assert_eq!(status.tx_hash.as_deref(), Some("0x1"));

        let err = parse_status_response(&json!({ "status": "teleported" })).unwrap_err();
        assert!(err.to_string().contains("teleported"));
    }
}
