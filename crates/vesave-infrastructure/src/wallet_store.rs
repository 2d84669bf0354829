//! In-memory wallet store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;
use vesave_core::Result;
use vesave_core::session::{WalletBundle, WalletSession, WalletStore};

use crate::keys::generate_keypair;

/// Wallet bundles keyed by session id, held in process memory only.
///
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryWalletStore {
    bundles: Arc<RwLock<HashMap<String, WalletBundle>>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a prebuilt bundle, replacing any bundle with the same id.
    pub async fn insert(&self, bundle: WalletBundle) {
        let mut bundles = self.bundles.write().await;
        bundles.insert(bundle.session_id.clone(), bundle);
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn create(&self) -> Result<WalletSession> {
        let bundle = WalletBundle {
            session_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            source: generate_keypair(),
            dest: generate_keypair(),
        };
        let session = bundle.public_session();

        self.insert(bundle).await;
        tracing::info!(session_id = %session.session_id, "[WalletStore] Created session wallet");

        Ok(session)
    }

    async fn get(&self, session_id: &str) -> Option<WalletBundle> {
        let bundles = self.bundles.read().await;
        bundles.get(session_id).cloned()
    }

    async fn delete(&self, session_id: &str) -> bool {
        let mut bundles = self.bundles.write().await;
        let removed = bundles.remove(session_id).is_some();
        if removed {
            tracing::info!(session_id, "[WalletStore] Deleted session wallet");
        }
        removed
    }

    async fn len(&self) -> usize {
        self.bundles.read().await.len()
    }

    async fn prune_older_than(&self, max_age: Duration) -> usize {
        // An age beyond the representable calendar means nothing has expired.
        let Some(cutoff) = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|max_age| Utc::now().checked_sub_signed(max_age))
        else {
            return 0;
        };

        let mut bundles = self.bundles.write().await;
        let before = bundles.len();
        bundles.retain(|_, bundle| bundle.created_at >= cutoff);
        let pruned = before - bundles.len();

        if pruned > 0 {
            tracing::info!(pruned, "[WalletStore] Pruned expired session wallets");
        }
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesave_core::address::addresses_match;

    #[tokio::test]
    async fn create_get_delete_lifecycle() {
        let store = InMemoryWalletStore::new();
        let session = store.create().await.unwrap();

        let bundle = store.get(&session.session_id).await.expect("bundle stored");
        assert!(addresses_match(&bundle.source.address, &session.source_address));
        assert!(addresses_match(&bundle.dest.address, &session.dest_address));
        assert_ne!(session.source_address, session.dest_address);
        assert_eq!(store.len().await, 1);

        assert!(store.delete(&session.session_id).await);
        assert!(!store.delete(&session.session_id).await);
        assert!(store.get(&session.session_id).await.is_none());
    }

    #[tokio::test]
    async fn sessions_get_unique_ids() {
        let store = InMemoryWalletStore::new();
        let first = store.create().await.unwrap();
        let second = store.create().await.unwrap();
        assert_ne!(first.session_id, second.session_id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn prunes_only_expired_bundles() {
        let store = InMemoryWalletStore::new();
        let fresh = store.create().await.unwrap();

        let mut stale = store.get(&fresh.session_id).await.unwrap();
        stale.session_id = "stale".to_string();
        stale.created_at = Utc::now() - chrono::Duration::hours(2);
        store.insert(stale).await;

        let pruned = store.prune_older_than(Duration::from_secs(3600)).await;
        assert_eq!(pruned, 1);
        assert!(store.get("stale").await.is_none());
        assert!(store.get(&fresh.session_id).await.is_some());
    }

    #[tokio::test]
    async fn huge_max_age_prunes_nothing() {
        let store = InMemoryWalletStore::new();
        store.create().await.unwrap();

        // Past the earliest representable date, but still a valid chrono::Duration.
        let pruned = store
            .prune_older_than(Duration::from_secs(10_000_000_000_000))
            .await;
        assert_eq!(pruned, 0);
        assert_eq!(store.prune_older_than(Duration::MAX).await, 0);
        assert_eq!(store.len().await, 1);
    }
}
