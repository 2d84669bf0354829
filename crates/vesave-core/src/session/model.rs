//! Session wallet domain model.

use serde::{Deserialize, Serialize};

use crate::address::addresses_match;
use crate::workflow::AccountSide;

/// Identifies one user's ephemeral wallet pair.
///
/// This is the public projection of a wallet bundle: it never carries key
/// material and is safe to hand to a browser or write to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    /// Opaque identifier bound to the keypair pair on the backend.
    pub session_id: String,
    /// Deposit address on the source chain.
    pub source_address: String,
    /// Operating address on the destination chain.
    pub dest_address: String,
}

impl WalletSession {
    pub fn new(
        session_id: impl Into<String>,
        source_address: impl Into<String>,
        dest_address: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            source_address: source_address.into(),
            dest_address: dest_address.into(),
        }
    }

    pub fn address(&self, side: AccountSide) -> &str {
        match side {
            AccountSide::Source => &self.source_address,
            AccountSide::Destination => &self.dest_address,
        }
    }

    /// Case-insensitive comparison of one of the session addresses.
    pub fn owns(&self, side: AccountSide, address: &str) -> bool {
        addresses_match(self.address(side), address)
    }
}
