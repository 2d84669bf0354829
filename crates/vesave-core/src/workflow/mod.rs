//! Workflow domain module: status model, inputs and run snapshots.

mod model;
mod status;

pub use model::{WorkflowInput, WorkflowParams, WorkflowSnapshot};
pub use status::{AccountSide, Stage, StepStatus, WorkflowStatuses};

/// Slippage applied to the swap when the caller does not choose one.
pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;
