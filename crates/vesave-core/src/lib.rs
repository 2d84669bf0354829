//! Domain layer for veSave.
//!
//! Holds the session and workflow models, the request/response types of the
//! three external stages, the client traits the orchestrator depends on, and
//! configuration.

pub mod address;
pub mod bridge;
pub mod config;
pub mod error;
pub mod quote;
pub mod session;
pub mod stake;
pub mod swap;
pub mod workflow;

// Re-export common error type
pub use error::{Result, VeSaveError};
