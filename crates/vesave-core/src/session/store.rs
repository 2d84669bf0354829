//! Wallet store interface and the private wallet bundle it holds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::model::WalletSession;
use crate::error::Result;

/// Hex-encoded private key. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretKeyHex(String);

impl SecretKeyHex {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKeyHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKeyHex(<redacted>)")
    }
}

/// One chain account: checksummed address plus its private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub address: String,
    pub private_key: SecretKeyHex,
}

/// The backend's private record for a session: both keypairs and bookkeeping.
#[derive(Debug, Clone)]
pub struct WalletBundle {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub source: KeyPair,
    pub dest: KeyPair,
}

impl WalletBundle {
    /// Public view without key material.
    pub fn public_session(&self) -> WalletSession {
        WalletSession::new(
            self.session_id.clone(),
            self.source.address.clone(),
            self.dest.address.clone(),
        )
    }
}

/// An explicit key-value store of wallet bundles keyed by session id.
///
/// Implementations are owned by a single service instance and passed by
/// reference to whoever needs them.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Generates a new keypair pair under a fresh session id.
    async fn create(&self) -> Result<WalletSession>;

    /// Returns the bundle for `session_id`, if live.
    async fn get(&self, session_id: &str) -> Option<WalletBundle>;

    /// Removes a bundle. Returns `false` when the session was unknown.
    async fn delete(&self, session_id: &str) -> bool;

    /// Number of live sessions.
    async fn len(&self) -> usize;

    /// Drops every bundle older than `max_age`, returning how many were removed.
    async fn prune_older_than(&self, max_age: Duration) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_key_debug_is_redacted() {
        let key = SecretKeyHex::new("deadbeef");
        assert_eq!(format!("{:?}", key), "SecretKeyHex(<redacted>)");
        assert_eq!(key.expose(), "deadbeef");
    }
}
