//! Runtime glue: logging setup, the workflow event stream and the runner
//! that wires configuration to the orchestrator.

pub mod logging;
pub mod runner;
pub mod tracing_layer;

pub use logging::{LogFormat, init_tracing};
pub use runner::WorkflowRunner;
pub use tracing_layer::{WorkflowEvent, WorkflowEventLayer};
