//! Error types for veSave.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workflow::{AccountSide, Stage};

/// A shared error type for the entire veSave workspace.
///
/// Workflow variants carry the exact text shown to the user; the UI renders a
/// single error string and does not distinguish variants beyond that.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VeSaveError {
    /// The workflow was started without a live session wallet.
    #[error("Create a deposit wallet before running the workflow.")]
    NoSession,

    /// The requested amount is not a finite number greater than zero.
    #[error("Provide a positive USDC amount to start the workflow.")]
    InvalidAmount { amount: f64 },

    /// A stage's parameters disagree with the session snapshot.
    #[error("{side} wallet mismatch between workflow and session wallet.")]
    WalletMismatch { side: AccountSide },

    /// An external call made by one stage failed.
    #[error("{message}")]
    StageFailed { stage: Stage, message: String },

    /// The run was reset or replaced by a newer run while a call was in flight.
    #[error("Workflow run {run_id} was superseded before it completed")]
    Superseded { run_id: u64 },

    /// Non-success HTTP response or transport failure.
    #[error("{message}")]
    Http { status: Option<u16>, message: String },

    /// Error reported verbatim by a remote service.
    #[error("{0}")]
    Upstream(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Request validation error
    #[error("{0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VeSaveError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a StageFailed error
    pub fn stage_failed(stage: Stage, message: impl Into<String>) -> Self {
        Self::StageFailed {
            stage,
            message: message.into(),
        }
    }

    /// Creates an Http error
    pub fn http(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates an Upstream error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error was raised before any stage ran.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NoSession | Self::InvalidAmount { .. })
    }

    /// Returns the failing stage for `StageFailed` errors.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for VeSaveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for VeSaveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for VeSaveError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for VeSaveError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used at binary boundaries)
impl From<anyhow::Error> for VeSaveError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, VeSaveError>`.
pub type Result<T> = std::result::Result<T, VeSaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_failure_displays_underlying_message() {
        let err = VeSaveError::stage_failed(Stage::Swap, "liquidity too low");
        assert_eq!(err.to_string(), "liquidity too low");
        assert_eq!(err.failed_stage(), Some(Stage::Swap));
    }

    #[test]
    fn wallet_mismatch_names_the_account_side() {
        let err = VeSaveError::WalletMismatch {
            side: AccountSide::Destination,
        };
        assert_eq!(
            err.to_string(),
            "VeChain wallet mismatch between workflow and session wallet."
        );
    }

    #[test]
    fn preconditions_are_classified() {
        assert!(VeSaveError::NoSession.is_precondition());
        assert!(VeSaveError::InvalidAmount { amount: 0.0 }.is_precondition());
        assert!(!VeSaveError::upstream("boom").is_precondition());
    }
}
