//! veSave backend: ephemeral session wallets, the WanBridge proxy and the
//! simulated conversion and staking endpoints.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderValue;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use vesave_core::session::WalletStore;

pub use error::ApiError;
pub use state::AppState;

/// Builds the full application router.
pub fn app_router(state: AppState) -> Router {
    let cors = cors_layer(&state.server.allowed_origins);

    Router::new()
        .nest("/api", routes::api_router())
        .layer(cors)
        .with_state(state)
}

/// Empty origin list allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("[Server] Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Periodically drops session wallets older than `ttl`.
pub fn spawn_session_pruner(store: Arc<dyn WalletStore>, ttl: Duration) -> JoinHandle<()> {
    let period = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let pruned = store.prune_older_than(ttl).await;
            if pruned > 0 {
                tracing::info!("[Server] Pruned {} expired session wallet(s)", pruned);
            }
        }
    })
}
