//! Bridge → swap → stake orchestration.
//!
//! A run executes the three stages strictly in order against one session
//! snapshot. Observable state is published through a `watch` channel; every
//! write is tagged with the run token that produced it and dropped once a
//! newer run or a reset has bumped the token.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use vesave_core::bridge::{BridgeClient, BridgeTransferRequest};
use vesave_core::session::WalletSession;
use vesave_core::stake::{StakeClient, StakeRequest, StakeResponse};
use vesave_core::swap::{ConversionRequest, SwapClient};
use vesave_core::workflow::{
    AccountSide, Stage, StepStatus, WorkflowInput, WorkflowParams, WorkflowSnapshot,
};
use vesave_core::{Result, VeSaveError};
use vesave_interaction::WorkflowClients;

use super::settings::WorkflowSettings;

/// Tracing target of every orchestrator event.
pub const WORKFLOW_TARGET: &str = "vesave::workflow";

/// Recorded when a run's future is dropped or panics mid-stage.
const RUN_INTERRUPTED: &str = "Workflow run was interrupted before it completed.";

pub struct WorkflowOrchestrator {
    bridge: Arc<dyn BridgeClient>,
    swap: Arc<dyn SwapClient>,
    stake: Arc<dyn StakeClient>,
    settings: WorkflowSettings,
    state: watch::Sender<WorkflowSnapshot>,
    /// Only mutated while holding the `state` lock.
    run_token: AtomicU64,
}

impl WorkflowOrchestrator {
    pub fn new(
        bridge: Arc<dyn BridgeClient>,
        swap: Arc<dyn SwapClient>,
        stake: Arc<dyn StakeClient>,
        settings: WorkflowSettings,
    ) -> Self {
        let (state, _) = watch::channel(WorkflowSnapshot::default());
        Self {
            bridge,
            swap,
            stake,
            settings,
            state,
            run_token: AtomicU64::new(0),
        }
    }

    pub fn from_clients(clients: &WorkflowClients, settings: WorkflowSettings) -> Self {
        Self::new(
            clients.bridge.clone(),
            clients.swap.clone(),
            clients.stake.clone(),
            settings,
        )
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Current observable state.
    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.state.borrow().clone()
    }

    /// Receives every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.state.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running
    }

    /// Runs bridge → swap → stake for `session`.
    ///
    /// Fails with `NoSession` or `InvalidAmount` before touching any state or
    /// client. On a stage failure the error is recorded against that stage and
    /// returned; later stages never run.
    pub async fn execute_full_flow(
        &self,
        session: Option<&WalletSession>,
        input: WorkflowInput,
    ) -> Result<StakeResponse> {
        let session = session.ok_or(VeSaveError::NoSession)?;
        validate_amount(input.usdc_amount)?;

        let params = WorkflowParams::from_session(session, input);
        self.execute_with_params(session, &params).await
    }

    /// Runs the pipeline with explicit parameters.
    ///
    /// Each stage first checks that the addresses it is about to use belong
    /// to `session`.
    pub async fn execute_with_params(
        &self,
        session: &WalletSession,
        params: &WorkflowParams,
    ) -> Result<StakeResponse> {
        validate_amount(params.usdc_amount)?;

        let run = ActiveRun::begin(self);
        let result = self.run_pipeline(run.run_id, session, params).await;
        run.finish(&result);
        result
    }

    /// Restores the idle state and invalidates any in-flight run.
    ///
    /// Does not cancel the in-flight network call; its result is discarded.
    pub fn reset_workflow(&self) {
        let mut superseded = 0;
        self.state.send_modify(|state| {
            superseded = self.run_token.fetch_add(1, Ordering::SeqCst);
            *state = WorkflowSnapshot::default();
        });
        tracing::debug!(target: WORKFLOW_TARGET, superseded, "[Workflow] Reset");
    }

    async fn run_pipeline(
        &self,
        run_id: u64,
        session: &WalletSession,
        params: &WorkflowParams,
    ) -> Result<StakeResponse> {
        self.ensure_wallet(run_id, session, AccountSide::Source, &params.source_address)?;
        self.ensure_wallet(run_id, session, AccountSide::Destination, &params.dest_address)?;
        let bridge_request = BridgeTransferRequest {
            session_id: params.session_id.clone(),
            payload: self.settings.route.payload(
                &params.source_address,
                &params.dest_address,
                params.usdc_amount,
            ),
        };
        self.run_step(
            run_id,
            Stage::Bridge,
            self.bridge.submit_transfer(&bridge_request),
            |state, receipt| state.last_bridge = Some(receipt),
        )
        .await?;

        self.ensure_wallet(run_id, session, AccountSide::Destination, &params.dest_address)?;
        let swap_request = ConversionRequest {
            session_id: Some(params.session_id.clone()),
            usdc_amount: params.usdc_amount,
            deposit_address: params.dest_address.clone(),
            slippage_bps: Some(
                params
                    .slippage_bps
                    .unwrap_or(self.settings.default_slippage_bps),
            ),
        };
        let swap = self
            .run_step(
                run_id,
                Stage::Swap,
                self.swap.convert(&swap_request),
                |state, receipt| state.last_swap = Some(receipt),
            )
            .await?;

        self.ensure_wallet(run_id, session, AccountSide::Destination, &params.dest_address)?;
        // Stake what the swap produced, not what the user entered.
        let stake_request = StakeRequest {
            session_id: Some(params.session_id.clone()),
            vet_amount: swap.vet_amount,
            deposit_address: params.dest_address.clone(),
            dst_chain_id: self.settings.stake_dst_chain_id,
            pool_id: self.settings.stake_pool_id,
        };
        self.run_step(
            run_id,
            Stage::Stake,
            self.stake.stake(&stake_request),
            |state, receipt| state.last_stake = Some(receipt),
        )
        .await
    }

    /// Uniform stage wrapper: clear error, mark pending, call, then record
    /// either the receipt and `success` or the message and `error`.
    async fn run_step<T, Fut, F>(
        &self,
        run_id: u64,
        stage: Stage,
        call: Fut,
        record: F,
    ) -> Result<T>
    where
        T: Clone,
        Fut: Future<Output = Result<T>>,
        F: FnOnce(&mut WorkflowSnapshot, T),
    {
        let started = self.apply(run_id, |state| {
            state.error = None;
            state.statuses.set(stage, StepStatus::Pending);
        });
        if !started {
            return Err(VeSaveError::Superseded { run_id });
        }
        log_stage(run_id, stage, StepStatus::Pending, None);

        match call.await {
            Ok(receipt) => {
                let stored = receipt.clone();
                let applied = self.apply(run_id, move |state| {
                    state.statuses.set(stage, StepStatus::Success);
                    record(state, stored);
                });
                if !applied {
                    return Err(VeSaveError::Superseded { run_id });
                }
                log_stage(run_id, stage, StepStatus::Success, None);
                Ok(receipt)
            }
            Err(err) => {
                let message = failure_message(stage, &err);
                let applied = self.apply(run_id, |state| {
                    state.statuses.set(stage, StepStatus::Error);
                    state.error = Some(message.clone());
                });
                if !applied {
                    return Err(VeSaveError::Superseded { run_id });
                }
                log_stage(run_id, stage, StepStatus::Error, Some(&message));
                Err(VeSaveError::stage_failed(stage, message))
            }
        }
    }

    fn ensure_wallet(
        &self,
        run_id: u64,
        session: &WalletSession,
        side: AccountSide,
        address: &str,
    ) -> Result<()> {
        if session.owns(side, address) {
            return Ok(());
        }
        let err = VeSaveError::WalletMismatch { side };
        let message = err.to_string();
        self.apply(run_id, |state| state.error = Some(message));
        tracing::warn!(target: WORKFLOW_TARGET, run_id, error = %err, "[Workflow] Wallet check failed");
        Err(err)
    }

    fn begin_run(&self) -> u64 {
        let mut run_id = 0;
        self.state.send_modify(|state| {
            run_id = self.run_token.fetch_add(1, Ordering::SeqCst) + 1;
            *state = WorkflowSnapshot {
                run_id,
                is_running: true,
                ..WorkflowSnapshot::default()
            };
        });
        tracing::info!(target: WORKFLOW_TARGET, run_id, "[Workflow] Run started");
        run_id
    }

    /// Applies `update` if `run_id` is still the current run.
    fn apply<F>(&self, run_id: u64, update: F) -> bool
    where
        F: FnOnce(&mut WorkflowSnapshot),
    {
        self.state.send_if_modified(|state| {
            if self.run_token.load(Ordering::SeqCst) != run_id {
                return false;
            }
            update(state);
            true
        })
    }
}

/// Owns the `is_running` flag of one run. Dropping it without `finish`
/// (cancelled future, panicking client) still clears the flag and marks
/// the stage that was pending as failed.
struct ActiveRun<'a> {
    orchestrator: &'a WorkflowOrchestrator,
    run_id: u64,
    finished: bool,
}

impl<'a> ActiveRun<'a> {
    fn begin(orchestrator: &'a WorkflowOrchestrator) -> Self {
        Self {
            run_id: orchestrator.begin_run(),
            orchestrator,
            finished: false,
        }
    }

    fn finish(mut self, result: &Result<StakeResponse>) {
        self.finished = true;
        let run_id = self.run_id;
        match result {
            Ok(receipt) => tracing::info!(
                target: WORKFLOW_TARGET,
                run_id,
                tx_hash = %receipt.tx_hash,
                "[Workflow] Run completed"
            ),
            Err(VeSaveError::Superseded { .. }) => tracing::info!(
                target: WORKFLOW_TARGET,
                run_id,
                "[Workflow] Run superseded, result discarded"
            ),
            Err(err) => tracing::warn!(
                target: WORKFLOW_TARGET,
                run_id,
                error = %err,
                "[Workflow] Run failed"
            ),
        }
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        let finished = self.finished;
        let applied = self.orchestrator.apply(self.run_id, |state| {
            state.is_running = false;
            if finished {
                return;
            }
            for stage in [Stage::Bridge, Stage::Swap, Stage::Stake] {
                if state.statuses.get(stage) == StepStatus::Pending {
                    state.statuses.set(stage, StepStatus::Error);
                }
            }
            state.error = Some(RUN_INTERRUPTED.to_string());
        });
        if applied && !finished {
            tracing::warn!(
                target: WORKFLOW_TARGET,
                run_id = self.run_id,
                "[Workflow] Run interrupted"
            );
        }
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(VeSaveError::InvalidAmount { amount })
    }
}

fn failure_message(stage: Stage, err: &VeSaveError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        stage.default_failure_message().to_string()
    } else {
        message
    }
}

fn log_stage(run_id: u64, stage: Stage, status: StepStatus, error: Option<&str>) {
    match error {
        None => tracing::info!(
            target: WORKFLOW_TARGET,
            run_id,
            stage = %stage,
            status = %status,
            "[Workflow] {} {}",
            stage,
            status
        ),
        Some(error) => tracing::warn!(
            target: WORKFLOW_TARGET,
            run_id,
            stage = %stage,
            status = %status,
            error,
            "[Workflow] {} {}",
            stage,
            status
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Notify;
    use vesave_core::bridge::{BridgeTransferResponse, BridgeTransferStatus};
    use vesave_core::swap::ConversionResponse;
    use vesave_core::workflow::WorkflowStatuses;

    const E: &str = "0xE000000000000000000000000000000000000001";
    const V: &str = "0xV000000000000000000000000000000000000002";

    /// Captures the published state at the moment each client is invoked.
    #[derive(Default)]
    struct Recorder {
        state: Mutex<Option<watch::Receiver<WorkflowSnapshot>>>,
        seen: Mutex<Vec<(Stage, WorkflowSnapshot)>>,
    }

    impl Recorder {
        fn observe(&self, stage: Stage) {
            let state = self.state.lock().unwrap();
            if let Some(rx) = state.as_ref() {
                let snapshot = rx.borrow().clone();
                self.seen.lock().unwrap().push((stage, snapshot));
            }
        }

        fn seen_at(&self, stage: Stage) -> WorkflowSnapshot {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .find(|(s, _)| *s == stage)
                .map(|(_, snapshot)| snapshot.clone())
                .unwrap()
        }
    }

    struct MockBridge {
        recorder: Arc<Recorder>,
        outcome: Result<BridgeTransferResponse>,
        /// Holds the first call until notified; later calls pass straight through.
        gate: Mutex<Option<Arc<Notify>>>,
        requests: Mutex<Vec<BridgeTransferRequest>>,
    }

    #[async_trait]
    impl BridgeClient for MockBridge {
        async fn submit_transfer(
            &self,
            request: &BridgeTransferRequest,
        ) -> Result<BridgeTransferResponse> {
            self.recorder.observe(Stage::Bridge);
            self.requests.lock().unwrap().push(request.clone());
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            self.outcome.clone()
        }

        async fn transfer_status(&self, _task_id: &str) -> Result<BridgeTransferStatus> {
            Err(VeSaveError::internal("not used"))
        }
    }

    struct PanickingBridge;

    #[async_trait]
    impl BridgeClient for PanickingBridge {
        async fn submit_transfer(
            &self,
            _request: &BridgeTransferRequest,
        ) -> Result<BridgeTransferResponse> {
            panic!("bridge client crashed");
        }

        async fn transfer_status(&self, _task_id: &str) -> Result<BridgeTransferStatus> {
            Err(VeSaveError::internal("not used"))
        }
    }

    struct MockSwap {
        recorder: Arc<Recorder>,
        outcome: Result<ConversionResponse>,
        requests: Mutex<Vec<ConversionRequest>>,
    }

    #[async_trait]
    impl SwapClient for MockSwap {
        async fn convert(&self, request: &ConversionRequest) -> Result<ConversionResponse> {
            self.recorder.observe(Stage::Swap);
            self.requests.lock().unwrap().push(request.clone());
            self.outcome.clone()
        }
    }

    struct MockStake {
        recorder: Arc<Recorder>,
        outcome: Result<StakeResponse>,
        requests: Mutex<Vec<StakeRequest>>,
    }

    #[async_trait]
    impl StakeClient for MockStake {
        async fn stake(&self, request: &StakeRequest) -> Result<StakeResponse> {
            self.recorder.observe(Stage::Stake);
            self.requests.lock().unwrap().push(request.clone());
            self.outcome.clone()
        }
    }

    struct Harness {
        orchestrator: Arc<WorkflowOrchestrator>,
        recorder: Arc<Recorder>,
        bridge: Arc<MockBridge>,
        swap: Arc<MockSwap>,
        stake: Arc<MockStake>,
    }

    impl Harness {
        fn client_calls(&self) -> (usize, usize, usize) {
            (
                self.bridge.requests.lock().unwrap().len(),
                self.swap.requests.lock().unwrap().len(),
                self.stake.requests.lock().unwrap().len(),
            )
        }
    }

    fn bridge_ok() -> Result<BridgeTransferResponse> {
        Ok(BridgeTransferResponse {
            task_id: Some("T1".into()),
            tx_hash: None,
        })
    }

    fn swap_ok() -> Result<ConversionResponse> {
        Ok(ConversionResponse {
            tx_hash: "0xSWAP".into(),
            vet_amount: "4.75".into(),
            minimum_received: "4.7".into(),
            quote_id: None,
            usdc_token: "U".into(),
            vet_token: "VET".into(),
        })
    }

    fn stake_ok() -> Result<StakeResponse> {
        Ok(StakeResponse {
            tx_hash: "0xSTAKE".into(),
            router_address: "0xR".into(),
        })
    }

    fn harness_with(
        bridge: Result<BridgeTransferResponse>,
        swap: Result<ConversionResponse>,
        stake: Result<StakeResponse>,
        gate: Option<Arc<Notify>>,
        settings: WorkflowSettings,
    ) -> Harness {
        let recorder = Arc::new(Recorder::default());
        let bridge = Arc::new(MockBridge {
            recorder: recorder.clone(),
            outcome: bridge,
            gate: Mutex::new(gate),
            requests: Mutex::new(Vec::new()),
        });
        let swap = Arc::new(MockSwap {
            recorder: recorder.clone(),
            outcome: swap,
            requests: Mutex::new(Vec::new()),
        });
        let stake = Arc::new(MockStake {
            recorder: recorder.clone(),
            outcome: stake,
            requests: Mutex::new(Vec::new()),
        });
        let orchestrator = Arc::new(WorkflowOrchestrator::new(
            bridge.clone(),
            swap.clone(),
            stake.clone(),
            settings,
        ));
        *recorder.state.lock().unwrap() = Some(orchestrator.subscribe());

        Harness {
            orchestrator,
            recorder,
            bridge,
            swap,
            stake,
        }
    }

    fn harness(
        bridge: Result<BridgeTransferResponse>,
        swap: Result<ConversionResponse>,
        stake: Result<StakeResponse>,
    ) -> Harness {
        harness_with(bridge, swap, stake, None, WorkflowSettings::default())
    }

    fn session() -> WalletSession {
        WalletSession::new("s-1", E, V)
    }

    fn statuses(bridge: StepStatus, swap: StepStatus, stake: StepStatus) -> WorkflowStatuses {
        WorkflowStatuses {
            bridge,
            swap,
            stake,
        }
    }

    #[tokio::test]
    async fn fails_without_session_and_leaves_state_idle() {
        let h = harness(bridge_ok(), swap_ok(), stake_ok());

        let err = h
            .orchestrator
            .execute_full_flow(None, WorkflowInput::new(5.0))
            .await
            .unwrap_err();

        assert_eq!(err, VeSaveError::NoSession);
        assert!(h.orchestrator.snapshot().is_cleared());
        assert_eq!(h.client_calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts_before_any_call() {
        let h = harness(bridge_ok(), swap_ok(), stake_ok());
        let session = session();

        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = h
                .orchestrator
                .execute_full_flow(Some(&session), WorkflowInput::new(amount))
                .await
                .unwrap_err();
            assert!(matches!(err, VeSaveError::InvalidAmount { .. }));
        }
        assert_eq!(h.client_calls(), (0, 0, 0));
        assert!(h.orchestrator.snapshot().is_cleared());
    }

    #[tokio::test]
    async fn full_run_succeeds_and_chains_swap_output_into_stake() {
        let h = harness(bridge_ok(), swap_ok(), stake_ok());
        let session = session();

        let receipt = h
            .orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(5.0))
            .await
            .unwrap();

        assert_eq!(receipt.tx_hash, "0xSTAKE");
        let snapshot = h.orchestrator.snapshot();
        assert_eq!(
            snapshot.statuses,
            statuses(StepStatus::Success, StepStatus::Success, StepStatus::Success)
        );
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.last_bridge.unwrap().task_id.as_deref(), Some("T1"));
        assert_eq!(snapshot.last_swap.unwrap().tx_hash, "0xSWAP");
        assert_eq!(snapshot.last_stake.unwrap().tx_hash, "0xSTAKE");

        let stake_requests = h.stake.requests.lock().unwrap();
        assert_eq!(stake_requests[0].vet_amount, "4.75");
        assert_eq!(stake_requests[0].deposit_address, V);

        let bridge_requests = h.bridge.requests.lock().unwrap();
        let payload = &bridge_requests[0].payload;
        assert_eq!(payload.from_account, E);
        assert_eq!(payload.to_account, V);
        assert_eq!(payload.amount, "5");
        assert_eq!(payload.from_chain, "ETH");
        assert_eq!(payload.to_chain, "VET");

        let swap_requests = h.swap.requests.lock().unwrap();
        assert_eq!(swap_requests[0].slippage_bps, Some(50));
        assert_eq!(swap_requests[0].session_id.as_deref(), Some("s-1"));
    }

    #[tokio::test]
    async fn stages_become_pending_only_after_predecessor_succeeds() {
        let h = harness(bridge_ok(), swap_ok(), stake_ok());
        let session = session();

        h.orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(5.0))
            .await
            .unwrap();

        let at_bridge = h.recorder.seen_at(Stage::Bridge);
        assert_eq!(
            at_bridge.statuses,
            statuses(StepStatus::Pending, StepStatus::Idle, StepStatus::Idle)
        );
        assert!(at_bridge.is_running);

        let at_swap = h.recorder.seen_at(Stage::Swap);
        assert_eq!(
            at_swap.statuses,
            statuses(StepStatus::Success, StepStatus::Pending, StepStatus::Idle)
        );

        let at_stake = h.recorder.seen_at(Stage::Stake);
        assert_eq!(
            at_stake.statuses,
            statuses(StepStatus::Success, StepStatus::Success, StepStatus::Pending)
        );

        for (_, snapshot) in h.recorder.seen.lock().unwrap().iter() {
            assert_eq!(snapshot.statuses.pending_count(), 1);
        }
    }

    #[tokio::test]
    async fn bridge_failure_short_circuits_swap_and_stake() {
        let h = harness(
            Err(VeSaveError::upstream("bridge unavailable")),
            swap_ok(),
            stake_ok(),
        );
        let session = session();

        let err = h
            .orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(5.0))
            .await
            .unwrap_err();

        assert_eq!(err.failed_stage(), Some(Stage::Bridge));
        assert_eq!(err.to_string(), "bridge unavailable");
        let snapshot = h.orchestrator.snapshot();
        assert_eq!(
            snapshot.statuses,
            statuses(StepStatus::Error, StepStatus::Idle, StepStatus::Idle)
        );
        assert_eq!(snapshot.error.as_deref(), Some("bridge unavailable"));
        assert!(!snapshot.is_running);
        assert_eq!(h.client_calls(), (1, 0, 0));
    }

    #[tokio::test]
    async fn swap_failure_records_message_and_skips_stake() {
        let h = harness(
            bridge_ok(),
            Err(VeSaveError::upstream("liquidity too low")),
            stake_ok(),
        );
        let session = session();

        let err = h
            .orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(5.0))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "liquidity too low");
        let snapshot = h.orchestrator.snapshot();
        assert_eq!(
            snapshot.statuses,
            statuses(StepStatus::Success, StepStatus::Error, StepStatus::Idle)
        );
        assert_eq!(snapshot.error.as_deref(), Some("liquidity too low"));
        assert!(snapshot.last_bridge.is_some());
        assert!(snapshot.last_swap.is_none());
        assert_eq!(h.client_calls(), (1, 1, 0));
    }

    #[tokio::test]
    async fn empty_failure_message_falls_back_to_stage_default() {
        let h = harness(bridge_ok(), swap_ok(), Err(VeSaveError::upstream("")));
        let session = session();

        let err = h
            .orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(5.0))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Stargate staking failed.");
        assert_eq!(
            h.orchestrator.snapshot().error.as_deref(),
            Some("Stargate staking failed.")
        );
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let h = harness(bridge_ok(), Err(VeSaveError::upstream("nope")), stake_ok());
        let session = session();
        let _ = h
            .orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(5.0))
            .await;
        assert!(!h.orchestrator.snapshot().is_cleared());

        h.orchestrator.reset_workflow();
        let once = h.orchestrator.snapshot();
        h.orchestrator.reset_workflow();
        h.orchestrator.reset_workflow();

        assert_eq!(h.orchestrator.snapshot(), once);
        assert_eq!(once, WorkflowSnapshot::default());
    }

    #[tokio::test]
    async fn mismatched_destination_is_rejected_before_bridging() {
        let h = harness(bridge_ok(), swap_ok(), stake_ok());
        let session = session();
        let mut params = WorkflowParams::from_session(&session, WorkflowInput::new(5.0));
        params.dest_address = "0x9999999999999999999999999999999999999999".into();

        let err = h
            .orchestrator
            .execute_with_params(&session, &params)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            VeSaveError::WalletMismatch {
                side: AccountSide::Destination
            }
        );
        let snapshot = h.orchestrator.snapshot();
        assert!(snapshot.statuses.all_idle());
        assert!(!snapshot.is_running);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("VeChain wallet mismatch between workflow and session wallet.")
        );
        assert_eq!(h.client_calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn mismatched_source_is_rejected_before_bridging() {
        let h = harness(bridge_ok(), swap_ok(), stake_ok());
        let session = session();
        let mut params = WorkflowParams::from_session(&session, WorkflowInput::new(5.0));
        params.source_address = "0x8888888888888888888888888888888888888888".into();

        let err = h
            .orchestrator
            .execute_with_params(&session, &params)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            VeSaveError::WalletMismatch {
                side: AccountSide::Source
            }
        );
        let snapshot = h.orchestrator.snapshot();
        assert!(snapshot.statuses.all_idle());
        assert!(!snapshot.is_running);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Ethereum wallet mismatch between workflow and session wallet.")
        );
        assert_eq!(h.client_calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn address_check_ignores_case() {
        let h = harness(bridge_ok(), swap_ok(), stake_ok());
        let session = session();
        let mut params = WorkflowParams::from_session(&session, WorkflowInput::new(1.0));
        params.source_address = E.to_lowercase();

        assert!(h.orchestrator.execute_with_params(&session, &params).await.is_ok());
    }

    #[tokio::test]
    async fn explicit_slippage_overrides_configured_default() {
        let settings = WorkflowSettings {
            default_slippage_bps: 75,
            stake_pool_id: Some(3),
            ..WorkflowSettings::default()
        };
        let h = harness_with(bridge_ok(), swap_ok(), stake_ok(), None, settings);
        let session = session();

        h.orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(2.0))
            .await
            .unwrap();
        h.orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(2.0).with_slippage_bps(10))
            .await
            .unwrap();

        let swaps = h.swap.requests.lock().unwrap();
        assert_eq!(swaps[0].slippage_bps, Some(75));
        assert_eq!(swaps[1].slippage_bps, Some(10));
        assert_eq!(h.stake.requests.lock().unwrap()[0].pool_id, Some(3));
    }

    #[tokio::test]
    async fn precondition_failure_does_not_start_a_run() {
        let h = harness(bridge_ok(), swap_ok(), stake_ok());
        let session = session();

        h.orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(5.0))
            .await
            .unwrap();
        let first = h.orchestrator.snapshot().run_id;

        let _ = h
            .orchestrator
            .execute_full_flow(None, WorkflowInput::new(5.0))
            .await;
        // Preconditions fail before the run starts; prior results stay visible.
        assert_eq!(h.orchestrator.snapshot().run_id, first);

        h.orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(5.0))
            .await
            .unwrap();
        assert_eq!(h.orchestrator.snapshot().run_id, first + 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reset_during_flight_discards_late_results() {
        let gate = Arc::new(Notify::new());
        let h = harness_with(
            bridge_ok(),
            swap_ok(),
            stake_ok(),
            Some(gate.clone()),
            WorkflowSettings::default(),
        );
        let mut rx = h.orchestrator.subscribe();

        let orchestrator = h.orchestrator.clone();
        let run = tokio::spawn(async move {
            let session = session();
            orchestrator
                .execute_full_flow(Some(&session), WorkflowInput::new(5.0))
                .await
        });

        rx.wait_for(|state| state.statuses.bridge == StepStatus::Pending)
            .await
            .unwrap();
        h.orchestrator.reset_workflow();
        gate.notify_one();

        let result = run.await.unwrap();
        assert!(matches!(result, Err(VeSaveError::Superseded { .. })));
        assert_eq!(h.orchestrator.snapshot(), WorkflowSnapshot::default());
        assert_eq!(h.client_calls(), (1, 0, 0));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn newer_run_supersedes_one_still_in_flight() {
        let gate = Arc::new(Notify::new());
        let h = harness_with(
            bridge_ok(),
            swap_ok(),
            stake_ok(),
            Some(gate.clone()),
            WorkflowSettings::default(),
        );
        let mut rx = h.orchestrator.subscribe();
        let session = session();

        let orchestrator = h.orchestrator.clone();
        let first_session = session.clone();
        let first = tokio::spawn(async move {
            orchestrator
                .execute_full_flow(Some(&first_session), WorkflowInput::new(5.0))
                .await
        });
        rx.wait_for(|state| state.run_id == 1 && state.statuses.bridge == StepStatus::Pending)
            .await
            .unwrap();

        let second = h
            .orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(3.0))
            .await
            .unwrap();
        assert_eq!(second.tx_hash, "0xSTAKE");

        gate.notify_one();
        let first = first.await.unwrap();
        assert_eq!(first, Err(VeSaveError::Superseded { run_id: 1 }));

        let snapshot = h.orchestrator.snapshot();
        assert_eq!(snapshot.run_id, 2);
        assert!(!snapshot.is_running);
        assert!(snapshot.statuses.all_succeeded());
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.last_stake, stake_ok().ok());
        assert_eq!(h.client_calls(), (2, 1, 1));
        assert_eq!(h.swap.requests.lock().unwrap()[0].usdc_amount, 3.0);
    }

    #[tokio::test]
    async fn cancelled_run_releases_running_flag() {
        let gate = Arc::new(Notify::new());
        let h = harness_with(
            bridge_ok(),
            swap_ok(),
            stake_ok(),
            Some(gate),
            WorkflowSettings::default(),
        );
        let session = session();

        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            h.orchestrator
                .execute_full_flow(Some(&session), WorkflowInput::new(5.0)),
        )
        .await;
        assert!(outcome.is_err(), "gated bridge should hold the run");

        let snapshot = h.orchestrator.snapshot();
        assert!(!snapshot.is_running);
        assert!(!h.orchestrator.is_running());
        assert_eq!(snapshot.statuses.bridge, StepStatus::Error);
        assert_eq!(snapshot.statuses.swap, StepStatus::Idle);
        assert_eq!(snapshot.error.as_deref(), Some(RUN_INTERRUPTED));

        // The gate is spent, so a fresh run goes through.
        h.orchestrator
            .execute_full_flow(Some(&session), WorkflowInput::new(5.0))
            .await
            .unwrap();
        assert!(h.orchestrator.snapshot().statuses.all_succeeded());
    }

    #[tokio::test]
    async fn panicking_client_releases_running_flag() {
        let h = harness(bridge_ok(), swap_ok(), stake_ok());
        let orchestrator = Arc::new(WorkflowOrchestrator::new(
            Arc::new(PanickingBridge),
            h.swap.clone(),
            h.stake.clone(),
            WorkflowSettings::default(),
        ));

        let running = orchestrator.clone();
        let joined = tokio::spawn(async move {
            let session = session();
            running
                .execute_full_flow(Some(&session), WorkflowInput::new(5.0))
                .await
        })
        .await;
        assert!(joined.unwrap_err().is_panic());

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.run_id, 1);
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.statuses.bridge, StepStatus::Error);
        assert_eq!(snapshot.error.as_deref(), Some(RUN_INTERRUPTED));
        assert_eq!(h.client_calls(), (0, 0, 0));
    }
}
