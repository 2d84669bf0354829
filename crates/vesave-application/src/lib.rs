//! Application layer for veSave.
//!
//! Coordinates the domain traits into the bridge → swap → stake workflow and
//! manages the single live session wallet.

pub mod session_manager;
pub mod workflow;

pub use session_manager::WalletSessionManager;
pub use workflow::{WORKFLOW_TARGET, WorkflowOrchestrator, WorkflowSettings};
