//! Local stand-ins for every outbound client.
//!
//! Selected once, at startup, when `mode = "simulated"`. Responses are
//! synthesized in-process; nothing here touches the network.

use async_trait::async_trait;
use uuid::Uuid;
use vesave_core::bridge::{
    BridgeClient, BridgeTaskState, BridgeTransferRequest, BridgeTransferResponse,
    BridgeTransferStatus,
};
use vesave_core::config::{RootConfig, VECHAIN_NATIVE_TOKEN};
use vesave_core::quote::quote_conversion;
use vesave_core::session::{WalletService, WalletSession, WalletStore};
use vesave_core::stake::{StakeClient, StakeRequest, StakeResponse};
use vesave_core::swap::{ConversionRequest, ConversionResponse, SwapClient};
use vesave_core::workflow::DEFAULT_SLIPPAGE_BPS;
use vesave_core::{Result, VeSaveError};
use vesave_infrastructure::InMemoryWalletStore;

/// Random 32-byte transaction hash.
pub fn random_tx_hash() -> String {
    let bytes: [u8; 32] = rand::random();
    format!("0x{}", hex::encode(bytes))
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedBridgeClient;

#[async_trait]
impl BridgeClient for SimulatedBridgeClient {
    async fn submit_transfer(
        &self,
        request: &BridgeTransferRequest,
    ) -> Result<BridgeTransferResponse> {
        tracing::debug!(
            session_id = %request.session_id,
            "[SimulatedBridge] Transfer of {}",
            request.payload.amount
        );
        Ok(BridgeTransferResponse {
            task_id: Some(format!("sim-{}", Uuid::new_v4().simple())),
            tx_hash: Some(random_tx_hash()),
        })
    }

    async fn transfer_status(&self, task_id: &str) -> Result<BridgeTransferStatus> {
        if task_id.trim().is_empty() {
            return Err(VeSaveError::invalid_input("Missing taskId for status query."));
        }
        Ok(BridgeTransferStatus {
            status: BridgeTaskState::Completed,
            tx_hash: Some(random_tx_hash()),
            reason: None,
        })
    }
}

/// Quotes at a fixed rate.
#[derive(Debug, Clone)]
pub struct SimulatedSwapClient {
    vet_per_usdc: f64,
    usdc_token: String,
}

impl SimulatedSwapClient {
    pub fn new(vet_per_usdc: f64, usdc_token: impl Into<String>) -> Self {
        Self {
            vet_per_usdc,
            usdc_token: usdc_token.into(),
        }
    }
}

#[async_trait]
impl SwapClient for SimulatedSwapClient {
    async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResponse> {
        if !(request.usdc_amount.is_finite() && request.usdc_amount > 0.0) {
            return Err(VeSaveError::invalid_input("Invalid usdcAmount supplied."));
        }
        let slippage_bps = request.slippage_bps.unwrap_or(DEFAULT_SLIPPAGE_BPS);
        let quote = quote_conversion(request.usdc_amount, slippage_bps, self.vet_per_usdc);

        Ok(ConversionResponse {
            tx_hash: random_tx_hash(),
            vet_amount: quote.vet_amount,
            minimum_received: quote.minimum_received,
            quote_id: Some(format!("sim-quote-{}", Uuid::new_v4().simple())),
            usdc_token: self.usdc_token.clone(),
            vet_token: VECHAIN_NATIVE_TOKEN.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedStakeClient {
    router_address: String,
}

impl SimulatedStakeClient {
    pub fn new(router_address: impl Into<String>) -> Self {
        Self {
            router_address: router_address.into(),
        }
    }
}

#[async_trait]
impl StakeClient for SimulatedStakeClient {
    async fn stake(&self, request: &StakeRequest) -> Result<StakeResponse> {
        let amount: f64 = request.vet_amount.parse().unwrap_or(f64::NAN);
        if !(amount.is_finite() && amount > 0.0) {
            return Err(VeSaveError::invalid_input("Invalid vetAmount supplied."));
        }
        Ok(StakeResponse {
            tx_hash: random_tx_hash(),
            router_address: self.router_address.clone(),
        })
    }
}

/// Wallets generated into a process-local store.
#[derive(Clone, Default)]
pub struct SimulatedWalletService {
    store: InMemoryWalletStore,
}

impl SimulatedWalletService {
    pub fn new(store: InMemoryWalletStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WalletService for SimulatedWalletService {
    async fn create_wallet(&self) -> Result<WalletSession> {
        self.store.create().await
    }

    async fn reset_wallet(&self, session_id: &str) -> Result<()> {
        if self.store.delete(session_id).await {
            Ok(())
        } else {
            Err(VeSaveError::not_found("session", session_id))
        }
    }
}

/// Builds the simulated swap client from configuration.
pub(crate) fn swap_from_config(config: &RootConfig) -> SimulatedSwapClient {
    SimulatedSwapClient::new(config.simulation.vet_per_usdc, config.bridge.to_token.clone())
}
