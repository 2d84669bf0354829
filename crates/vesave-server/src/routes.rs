//! Route handlers under `/api`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use vesave_core::VeSaveError;
use vesave_core::address::addresses_match;
use vesave_core::bridge::{
    BridgeTransferPayload, BridgeTransferResponse, BridgeTransferStatus, validate_task_id,
};
use vesave_core::config::VECHAIN_NATIVE_TOKEN;
use vesave_core::quote::{format_decimal, quote_conversion};
use vesave_core::session::{WalletBundle, WalletSession};
use vesave_core::stake::StakeResponse;
use vesave_core::swap::ConversionResponse;
use vesave_core::workflow::DEFAULT_SLIPPAGE_BPS;
use vesave_interaction::simulated::random_tx_hash;

use crate::error::ApiError;
use crate::state::AppState;

const UNKNOWN_SESSION: &str = "Unknown session. Create a wallet first.";

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/wallets", post(create_wallet))
        .route("/wallets/:session_id", delete(delete_wallet))
        .route("/bridge/create", post(create_bridge_transfer))
        .route("/bridge/status", post(bridge_status))
        .route("/conversion/usdc-to-vet", post(convert_usdc_to_vet))
        .route("/stargate/stake", post(stake))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub wanbridge_base: String,
    /// Whether bridge transactions can be signed and broadcast.
    pub source_provider: bool,
    pub active_sessions: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        wanbridge_base: state.gateway.api_base().to_string(),
        source_provider: state.submitter.is_some(),
        active_sessions: state.store.len().await,
    })
}

async fn create_wallet(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<WalletSession>), ApiError> {
    let session = state.store.create().await.map_err(|e| {
        tracing::error!("[Server] Failed to create wallet bundle: {}", e);
        ApiError::internal("Unable to create wallet. Check server logs.")
    })?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn delete_wallet(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete(&session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::unknown_session("Unknown session."))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeCreateBody {
    pub session_id: Option<String>,
    pub payload: Option<BridgeTransferPayload>,
}

/// Creates the upstream task, then signs and broadcasts its source-chain
/// transaction with the session's source key.
async fn create_bridge_transfer(
    State(state): State<AppState>,
    body: Result<Json<BridgeCreateBody>, JsonRejection>,
) -> Result<Json<BridgeTransferResponse>, ApiError> {
    let Json(body) = body.map_err(reject)?;
    let session_id = non_empty(body.session_id)
        .ok_or_else(|| ApiError::invalid_input("sessionId is required."))?;
    let payload = body
        .payload
        .ok_or_else(|| ApiError::invalid_input("Bridge payload is required."))?;
    let submitter = state.submitter.clone().ok_or_else(|| {
        ApiError::internal(
            "source_rpc_url is not configured. Unable to submit bridge transaction.",
        )
    })?;

    let bundle = known_session(&state, &session_id).await?;
    if !addresses_match(&payload.from_account, &bundle.source.address)
        || !addresses_match(&payload.to_account, &bundle.dest.address)
    {
        return Err(ApiError::invalid_input(
            "Bridge payload accounts do not match the session wallet.",
        ));
    }

    let created = state.gateway.create_transfer(&payload).await.map_err(|e| {
        tracing::error!(session_id = %session_id, "[Server] WanBridge create failed: {}", e);
        ApiError::upstream(e)
    })?;
    let tx = created
        .tx_data
        .or_else(|| payload.tx_data.clone())
        .ok_or_else(|| {
            ApiError::upstream(VeSaveError::http(
                Some(502),
                "WanBridge returned no transaction to submit.",
            ))
        })?;

    let tx_hash = submitter
        .submit(&bundle.source, &payload.from_token, &tx)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %session_id, "[Server] Bridge transaction failed: {}", e);
            ApiError::upstream(e)
        })?;
    tracing::info!(
        session_id = %session_id,
        task_id = created.task_id.as_deref().unwrap_or("-"),
        "[Server] Bridge transaction confirmed: {}",
        tx_hash
    );

    Ok(Json(BridgeTransferResponse {
        task_id: created.task_id,
        tx_hash: Some(tx_hash),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeStatusBody {
    pub task_id: Option<String>,
}

async fn bridge_status(
    State(state): State<AppState>,
    body: Result<Json<BridgeStatusBody>, JsonRejection>,
) -> Result<Json<BridgeTransferStatus>, ApiError> {
    let Json(body) = body.map_err(reject)?;
    let task_id = non_empty(body.task_id)
        .ok_or_else(|| ApiError::invalid_input("Missing taskId for status query."))?;
    validate_task_id(&task_id)?;

    let status = state.gateway.transfer_status(&task_id).await.map_err(|e| {
        tracing::warn!(task_id = %task_id, "[Server] WanBridge status failed: {}", e);
        ApiError::upstream(e)
    })?;
    Ok(Json(status))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionBody {
    pub session_id: Option<String>,
    pub usdc_amount: Option<Value>,
    pub deposit_address: Option<String>,
    pub slippage_bps: Option<Value>,
}

async fn convert_usdc_to_vet(
    State(state): State<AppState>,
    body: Result<Json<ConversionBody>, JsonRejection>,
) -> Result<Json<ConversionResponse>, ApiError> {
    let Json(body) = body.map_err(reject)?;
    if let Some(session_id) = non_empty(body.session_id) {
        known_session(&state, &session_id).await?;
    }

    let usdc_amount = positive_amount(body.usdc_amount.as_ref())
        .ok_or_else(|| ApiError::invalid_input("Invalid usdcAmount supplied."))?;
    let deposit_address = non_empty(body.deposit_address)
        .ok_or_else(|| ApiError::invalid_input("depositAddress is required."))?;

    let slippage_bps = body
        .slippage_bps
        .as_ref()
        .and_then(number)
        .map(|bps| bps.clamp(0.0, 10_000.0).round() as u32)
        .unwrap_or(DEFAULT_SLIPPAGE_BPS);
    let quote = quote_conversion(usdc_amount, slippage_bps, state.server.vet_per_usdc);

    tracing::info!(
        deposit_address = %deposit_address,
        "[Server] Quoted {} USDC -> {} VET",
        usdc_amount,
        quote.vet_amount
    );

    Ok(Json(ConversionResponse {
        tx_hash: random_tx_hash(),
        vet_amount: quote.vet_amount,
        minimum_received: quote.minimum_received,
        quote_id: Some(format!("quote-{}", Uuid::new_v4())),
        usdc_token: state.usdc_token.clone(),
        vet_token: VECHAIN_NATIVE_TOKEN.to_string(),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StakeBody {
    pub session_id: Option<String>,
    pub vet_amount: Option<Value>,
    pub deposit_address: Option<String>,
    pub dst_chain_id: Option<u32>,
    pub pool_id: Option<u32>,
}

/// Stake receipt plus an echo of what was staked.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeReceipt {
    #[serde(flatten)]
    pub response: StakeResponse,
    pub deposit_address: String,
    pub vet_amount: String,
    pub dst_chain_id: Option<u32>,
    pub pool_id: Option<u32>,
}

async fn stake(
    State(state): State<AppState>,
    body: Result<Json<StakeBody>, JsonRejection>,
) -> Result<Json<StakeReceipt>, ApiError> {
    let Json(body) = body.map_err(reject)?;
    let bundle = match non_empty(body.session_id) {
        Some(session_id) => Some(known_session(&state, &session_id).await?),
        None => None,
    };

    let deposit_address = non_empty(body.deposit_address)
        .ok_or_else(|| ApiError::invalid_input("depositAddress is required."))?;
    let owned = bundle
        .as_ref()
        .is_none_or(|bundle| addresses_match(&deposit_address, &bundle.dest.address));
    if !owned {
        return Err(ApiError::invalid_input(
            "depositAddress does not belong to the session wallet.",
        ));
    }
    let vet_amount = positive_amount(body.vet_amount.as_ref())
        .ok_or_else(|| ApiError::invalid_input("Invalid vetAmount supplied."))?;

    Ok(Json(StakeReceipt {
        response: StakeResponse {
            tx_hash: random_tx_hash(),
            router_address: state.stake_router.clone(),
        },
        deposit_address,
        vet_amount: format_decimal(vet_amount),
        dst_chain_id: body.dst_chain_id,
        pool_id: body.pool_id,
    }))
}

async fn known_session(state: &AppState, session_id: &str) -> Result<WalletBundle, ApiError> {
    state
        .store
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::unknown_session(UNKNOWN_SESSION))
}

fn reject(rejection: JsonRejection) -> ApiError {
    ApiError::invalid_input(rejection.body_text())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts JSON numbers and numeric strings.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn positive_amount(value: Option<&Value>) -> Option<f64> {
    value
        .and_then(number)
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}
