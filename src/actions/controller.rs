use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use thiserror::Error;
use tokio::{sync::Mutex, time};
use tokio_util::sync::CancellationToken;

use crate::{
    models::ReportStatus,
    settings::WorkflowSettings,
    workflow::{EventSink, ReportWorkflow, WorkflowEvent},
};

use super::{ActionKind, ActionState, ActionStates};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("process the report before saving it")]
    NothingToSave,
    #[error("process the report before finalizing it")]
    ReportNotProcessed,
    #[error("{action} is already in progress")]
    AlreadyRunning { action: ActionKind },
}

#[derive(Debug, Clone, Copy)]
pub struct ActionTiming {
    pub busy: Duration,
    pub done: Duration,
}

impl From<&WorkflowSettings> for ActionTiming {
    fn from(settings: &WorkflowSettings) -> Self {
        Self {
            busy: settings.action_busy(),
            done: settings.action_done(),
        }
    }
}

/// Save/finalize buttons shown under the report preview. Each button walks
/// `Idle -> Busy -> Done -> Idle` on a timer.
#[derive(Clone)]
pub struct ActionBar {
    workflow: ReportWorkflow,
    sink: Arc<dyn EventSink>,
    states: Arc<Mutex<ActionStates>>,
    cancel_token: Arc<Mutex<CancellationToken>>,
    timing: Arc<RwLock<ActionTiming>>,
}

impl ActionBar {
    pub fn new(
        workflow: ReportWorkflow,
        sink: Arc<dyn EventSink>,
        settings: &WorkflowSettings,
    ) -> Self {
        Self {
            workflow,
            sink,
            states: Arc::new(Mutex::new(ActionStates::default())),
            cancel_token: Arc::new(Mutex::new(CancellationToken::new())),
            timing: Arc::new(RwLock::new(ActionTiming::from(settings))),
        }
    }

    pub fn timing(&self) -> ActionTiming {
        *self.timing.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Picked up by the next button press; pending transitions keep their delays.
    pub fn update_timing(&self, settings: &WorkflowSettings) {
        *self.timing.write().unwrap_or_else(|poisoned| poisoned.into_inner()) =
            ActionTiming::from(settings);
    }

    pub async fn states(&self) -> ActionStates {
        *self.states.lock().await
    }

    pub async fn save_draft(&self) -> Result<(), ActionError> {
        self.start(ActionKind::SaveDraft).await
    }

    pub async fn finalize_report(&self) -> Result<(), ActionError> {
        self.start(ActionKind::Finalize).await
    }

    /// Drops any pending transitions and puts both buttons back to idle.
    pub async fn dispose(&self) {
        {
            let mut token = self.cancel_token.lock().await;
            token.cancel();
            *token = CancellationToken::new();
        }
        *self.states.lock().await = ActionStates::default();
    }

    async fn start(&self, kind: ActionKind) -> Result<(), ActionError> {
        let report = self.workflow.report_preview().await.ok_or(match kind {
            ActionKind::SaveDraft => ActionError::NothingToSave,
            ActionKind::Finalize => ActionError::ReportNotProcessed,
        })?;

        {
            let mut states = self.states.lock().await;
            if states.get(kind) != ActionState::Idle {
                return Err(ActionError::AlreadyRunning { action: kind });
            }
            states.set(kind, ActionState::Busy);
        }
        self.emit_state(kind, ActionState::Busy);
        log_info!("Started {} for report {}", kind, report.id);

        let token = self.cancel_token.lock().await.clone();
        let timing = self.timing();
        tokio::spawn(run_action(self.clone(), kind, report.id, timing, token));
        Ok(())
    }

    async fn transition(&self, kind: ActionKind, state: ActionState) {
        self.states.lock().await.set(kind, state);
        self.emit_state(kind, state);
    }

    fn emit_state(&self, action: ActionKind, state: ActionState) {
        self.sink.emit(WorkflowEvent::ActionStateChanged {
            action,
            state,
            label: action.label(state),
        });
    }
}

async fn run_action(
    bar: ActionBar,
    kind: ActionKind,
    report_id: String,
    timing: ActionTiming,
    token: CancellationToken,
) {
    if !wait_unless_cancelled(&token, timing.busy).await {
        return;
    }

    let status = match kind {
        ActionKind::SaveDraft => ReportStatus::Draft,
        ActionKind::Finalize => ReportStatus::Completed,
    };
    if bar.workflow.set_report_status(&report_id, status).await.is_none() {
        log_warn!("Report {} is no longer current; {} not applied", report_id, kind);
    }
    bar.transition(kind, ActionState::Done).await;

    if !wait_unless_cancelled(&token, timing.done).await {
        return;
    }
    bar.transition(kind, ActionState::Idle).await;

    if kind == ActionKind::Finalize {
        log_info!("Report {} finalized", report_id);
        bar.sink.emit(WorkflowEvent::ReportFinalized { report_id });
    }
}

async fn wait_unless_cancelled(token: &CancellationToken, delay: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = time::sleep(delay) => true,
    }
}
