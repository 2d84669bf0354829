//! Infrastructure layer for veSave: key generation, the in-memory wallet
//! store, configuration loading and on-disk session storage.

pub mod config_service;
pub mod keys;
pub mod paths;
pub mod storage;
pub mod wallet_store;

pub use crate::config_service::ConfigService;
pub use crate::storage::ActiveSessionFile;
pub use crate::wallet_store::InMemoryWalletStore;
