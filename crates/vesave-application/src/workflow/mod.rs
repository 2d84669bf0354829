//! Workflow orchestration.

mod orchestrator;
mod settings;

pub use orchestrator::{WORKFLOW_TARGET, WorkflowOrchestrator};
pub use settings::WorkflowSettings;
