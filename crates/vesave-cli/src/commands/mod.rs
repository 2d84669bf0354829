pub mod bridge;
pub mod config;
pub mod run;
pub mod wallet;

use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc;
use vesave_core::config::RootConfig;
use vesave_execution::{LogFormat, WorkflowEvent, WorkflowRunner, init_tracing};
use vesave_infrastructure::{ActiveSessionFile, ConfigService};

/// Shared state of one CLI invocation.
pub struct CliContext {
    pub config: RootConfig,
    pub session_file: ActiveSessionFile,
}

impl CliContext {
    /// Sets up logging and loads configuration.
    ///
    /// Returns the receiving end of the workflow event stream.
    pub fn init(
        config_path: Option<PathBuf>,
        json_logs: bool,
    ) -> Result<(Self, mpsc::UnboundedReceiver<WorkflowEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let format = if json_logs {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };
        // Workflow progress is printed from the event stream.
        init_tracing(format, "warn,vesave::workflow=off", Some(tx))?;

        let config_service = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new()?,
        };
        let config = config_service.get_config()?;

        Ok((
            Self {
                config,
                session_file: ActiveSessionFile::new()?,
            },
            rx,
        ))
    }

    /// Builds a runner around the stored session wallet.
    pub fn runner(&self) -> Result<WorkflowRunner> {
        let session = self.session_file.load()?;
        Ok(WorkflowRunner::new(self.config.clone(), session)?)
    }
}
