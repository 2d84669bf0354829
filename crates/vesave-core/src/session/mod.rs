//! Session wallet domain module.
//!
//! - `model`: the public session snapshot (`WalletSession`)
//! - `store`: the backend's key-value store of private wallet bundles
//! - `service`: the create/reset boundary used by front ends

mod model;
mod service;
mod store;

pub use model::WalletSession;
pub use service::WalletService;
pub use store::{KeyPair, SecretKeyHex, WalletBundle, WalletStore};
