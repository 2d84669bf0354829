use std::sync::Arc;
use tokio::sync::RwLock;
use vesave_core::Result;
use vesave_core::session::{WalletService, WalletSession};

/// Owns the single live session wallet of a front end.
///
/// Creating a wallet replaces the current one; the replaced session is
/// released on the backend on a best-effort basis.
pub struct WalletSessionManager {
    service: Arc<dyn WalletService>,
    current: RwLock<Option<WalletSession>>,
}

impl WalletSessionManager {
    pub fn new(service: Arc<dyn WalletService>) -> Self {
        Self {
            service,
            current: RwLock::new(None),
        }
    }

    /// Starts with a session restored from elsewhere (e.g. the CLI's session file).
    pub fn with_session(service: Arc<dyn WalletService>, session: Option<WalletSession>) -> Self {
        Self {
            service,
            current: RwLock::new(session),
        }
    }

    pub async fn current(&self) -> Option<WalletSession> {
        self.current.read().await.clone()
    }

    pub async fn create_wallet(&self) -> Result<WalletSession> {
        let session = self.service.create_wallet().await?;

        let previous = self.current.write().await.replace(session.clone());
        if let Some(previous) = previous {
            self.release(&previous).await;
        }

        tracing::info!(
            session_id = %session.session_id,
            "[WalletSessionManager] Session wallet ready"
        );
        Ok(session)
    }

    /// Drops the live session, returning it. Backend failures are logged only.
    pub async fn reset_wallet(&self) -> Option<WalletSession> {
        let previous = self.current.write().await.take();
        if let Some(previous) = &previous {
            self.release(previous).await;
        }
        previous
    }

    async fn release(&self, session: &WalletSession) {
        if let Err(e) = self.service.reset_wallet(&session.session_id).await {
            tracing::warn!(
                session_id = %session.session_id,
                "[WalletSessionManager] Failed to delete session wallet from backend: {}",
                e
            );
        }
    }
}
