//! Bridge service seams.

use async_trait::async_trait;

use super::model::{
    BridgeTaskCreated, BridgeTransferPayload, BridgeTransferRequest, BridgeTransferResponse,
    BridgeTransferStatus,
};
use crate::error::Result;

/// Client-side access to the bridge, as used by the workflow orchestrator.
#[async_trait]
pub trait BridgeClient: Send + Sync {
    /// Submits a cross-chain transfer for a session wallet.
    async fn submit_transfer(
        &self,
        request: &BridgeTransferRequest,
    ) -> Result<BridgeTransferResponse>;

    /// Looks up the progress of a previously submitted transfer.
    async fn transfer_status(&self, task_id: &str) -> Result<BridgeTransferStatus>;
}

/// Server-side access to the hosted bridge API.
#[async_trait]
pub trait BridgeGateway: Send + Sync {
    /// Creates a transfer task upstream.
    async fn create_transfer(&self, payload: &BridgeTransferPayload) -> Result<BridgeTaskCreated>;

    /// `task_id` is interpolated into the upstream URL, so implementations
    /// reject anything outside `[A-Za-z0-9_-]`.
    async fn transfer_status(&self, task_id: &str) -> Result<BridgeTransferStatus>;

    /// Base URL of the upstream API, reported by health checks.
    fn api_base(&self) -> &str;
}
