//! Session wallet service trait.

use async_trait::async_trait;

use super::model::WalletSession;
use crate::error::Result;

/// Creates and destroys ephemeral session wallets.
///
/// The orchestrator never talks to this service; it only receives the
/// resulting [`WalletSession`] snapshot.
#[async_trait]
pub trait WalletService: Send + Sync {
    /// Creates a new deposit/destination keypair pair bound to a session id.
    async fn create_wallet(&self) -> Result<WalletSession>;

    /// Destroys the keypairs bound to `session_id`.
    async fn reset_wallet(&self, session_id: &str) -> Result<()>;
}
