//! Subscriber initialisation shared by the binaries.

use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};
use vesave_core::{Result, VeSaveError};

use crate::tracing_layer::{WorkflowEvent, WorkflowEventLayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Installs the global subscriber.
///
/// Logs go to stderr, filtered by `RUST_LOG` or else `default_filter`. The
/// filter applies to log output only: when `workflow_events` is given, every
/// workflow event is forwarded to it regardless of level.
pub fn init_tracing(
    format: LogFormat,
    default_filter: &str,
    workflow_events: Option<mpsc::UnboundedSender<WorkflowEvent>>,
) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .with(workflow_events.map(WorkflowEventLayer::new))
        .try_init()
        .map_err(|e| VeSaveError::internal(format!("Failed to initialise tracing: {}", e)))
}
