//! Wiring from configuration to a ready-to-run workflow.

use std::sync::Arc;
use vesave_application::{WalletSessionManager, WorkflowOrchestrator, WorkflowSettings};
use vesave_core::Result;
use vesave_core::bridge::BridgeTransferStatus;
use vesave_core::config::{ClientMode, RootConfig};
use vesave_core::session::WalletSession;
use vesave_core::stake::StakeResponse;
use vesave_core::workflow::WorkflowInput;
use vesave_interaction::WorkflowClients;

/// Owns the clients, the orchestrator and the live session of one front end.
pub struct WorkflowRunner {
    config: RootConfig,
    clients: WorkflowClients,
    orchestrator: Arc<WorkflowOrchestrator>,
    sessions: WalletSessionManager,
}

impl WorkflowRunner {
    /// Resolves the client mode and builds everything from `config`.
    ///
    /// `session` restores a previously created session wallet.
    pub fn new(config: RootConfig, session: Option<WalletSession>) -> Result<Self> {
        let clients = WorkflowClients::from_config(&config)?;
        let orchestrator = Arc::new(WorkflowOrchestrator::from_clients(
            &clients,
            WorkflowSettings::from_config(&config),
        ));
        let sessions = WalletSessionManager::with_session(clients.wallet.clone(), session);

        Ok(Self {
            config,
            clients,
            orchestrator,
            sessions,
        })
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    pub fn mode(&self) -> ClientMode {
        self.clients.mode
    }

    pub fn orchestrator(&self) -> Arc<WorkflowOrchestrator> {
        self.orchestrator.clone()
    }

    pub fn sessions(&self) -> &WalletSessionManager {
        &self.sessions
    }

    /// Runs the full flow against the live session, if any.
    pub async fn run(&self, input: WorkflowInput) -> Result<StakeResponse> {
        let session = self.sessions.current().await;
        self.orchestrator
            .execute_full_flow(session.as_ref(), input)
            .await
    }

    pub async fn bridge_status(&self, task_id: &str) -> Result<BridgeTransferStatus> {
        self.clients.bridge.transfer_status(task_id).await
    }
}
