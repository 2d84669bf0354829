//! Clients for the veSave backend (`/api/...`).
//!
//! Each client is a thin typed wrapper over one endpoint; errors carry the
//! backend's `{ "error": ... }` message unchanged so the workflow can show it.

use async_trait::async_trait;
use serde::Serialize;
use vesave_core::bridge::{
    BridgeClient, BridgeTransferRequest, BridgeTransferResponse, BridgeTransferStatus,
};
use vesave_core::session::{WalletService, WalletSession};
use vesave_core::stake::{StakeClient, StakeRequest, StakeResponse};
use vesave_core::swap::{ConversionRequest, ConversionResponse, SwapClient};
use vesave_core::{Result, VeSaveError};

use crate::http::JsonHttp;

const WALLETS_PATH: &str = "/wallets";
const BRIDGE_CREATE_PATH: &str = "/bridge/create";
const BRIDGE_STATUS_PATH: &str = "/bridge/status";
const CONVERSION_PATH: &str = "/conversion/usdc-to-vet";
const STAKE_PATH: &str = "/stargate/stake";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusQuery<'a> {
    task_id: &'a str,
}

/// Bridge submissions through the backend proxy.
#[derive(Debug, Clone)]
pub struct HttpBridgeClient {
    http: JsonHttp,
}

impl HttpBridgeClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: JsonHttp::new(api_base),
        }
    }
}

#[async_trait]
impl BridgeClient for HttpBridgeClient {
    async fn submit_transfer(
        &self,
        request: &BridgeTransferRequest,
    ) -> Result<BridgeTransferResponse> {
        tracing::debug!(
            session_id = %request.session_id,
            "[HttpBridgeClient] Submitting transfer of {}",
            request.payload.amount
        );
        self.http.post_json(BRIDGE_CREATE_PATH, request).await
    }

    async fn transfer_status(&self, task_id: &str) -> Result<BridgeTransferStatus> {
        if task_id.trim().is_empty() {
            return Err(VeSaveError::invalid_input("Missing taskId for status query."));
        }
        self.http
            .post_json(BRIDGE_STATUS_PATH, &StatusQuery { task_id })
            .await
    }
}

/// USDC → VET conversion through the backend.
#[derive(Debug, Clone)]
pub struct HttpSwapClient {
    http: JsonHttp,
}

impl HttpSwapClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: JsonHttp::new(api_base),
        }
    }
}

#[async_trait]
impl SwapClient for HttpSwapClient {
    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResponse> {
        self.http.post_json(CONVERSION_PATH, request).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpStakeClient {
    http: JsonHttp,
}

impl HttpStakeClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: JsonHttp::new(api_base),
        }
    }
}

#[async_trait]
impl StakeClient for HttpStakeClient {
    async fn stake(&self, request: &StakeRequest) -> Result<StakeResponse> {
        self.http.post_json(STAKE_PATH, request).await
    }
}

/// Session wallets held by the backend's wallet store.
#[derive(Debug, Clone)]
pub struct HttpWalletService {
    http: JsonHttp,
}

impl HttpWalletService {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            http: JsonHttp::new(api_base),
        }
    }
}

#[async_trait]
impl WalletService for HttpWalletService {
    async fn create_wallet(&self) -> Result<WalletSession> {
        let session: WalletSession = self.http.post_empty(WALLETS_PATH).await?;
        tracing::info!(
            session_id = %session.session_id,
            "[HttpWalletService] Created session wallet"
        );
        Ok(session)
    }

    async fn reset_wallet(&self, session_id: &str) -> Result<()> {
        let path = format!("{}/{}", WALLETS_PATH, session_id);
        match self.http.delete(&path).await {
            Err(err) if err.http_status() == Some(404) => {
                Err(VeSaveError::not_found("session", session_id))
            }
            other => other,
        }
    }
}
