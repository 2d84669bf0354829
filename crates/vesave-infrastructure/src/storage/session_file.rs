//! The CLI's record of its single live session wallet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vesave_core::Result;
use vesave_core::session::WalletSession;

use super::atomic_toml::AtomicTomlFile;
use crate::paths::VeSavePaths;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredSession {
    session: WalletSession,
    created_at: DateTime<Utc>,
}

/// Persists at most one [`WalletSession`] between CLI invocations.
pub struct ActiveSessionFile {
    file: AtomicTomlFile<StoredSession>,
}

impl ActiveSessionFile {
    /// Uses `~/.config/vesave/session.toml`.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(VeSavePaths::session_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    pub fn load(&self) -> Result<Option<WalletSession>> {
        Ok(self.file.load()?.map(|stored| stored.session))
    }

    /// Replaces whatever session was stored before.
    pub fn save(&self, session: &WalletSession) -> Result<()> {
        self.file.save(&StoredSession {
            session: session.clone(),
            created_at: Utc::now(),
        })
    }

    pub fn clear(&self) -> Result<bool> {
        self.file.remove()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stores_a_single_session() {
        let temp_dir = TempDir::new().unwrap();
        let file = ActiveSessionFile::with_path(temp_dir.path().join("session.toml"));
        assert_eq!(file.load().unwrap(), None);

        let first = WalletSession::new("s-1", "0xE1", "0xV1");
        let second = WalletSession::new("s-2", "0xE2", "0xV2");
        file.save(&first).unwrap();
        file.save(&second).unwrap();
        assert_eq!(file.load().unwrap(), Some(second));

        assert!(file.clear().unwrap());
        assert_eq!(file.load().unwrap(), None);
    }
}
