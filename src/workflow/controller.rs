use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use serde::Serialize;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    models::{GeneratedReport, ReportDraft, ReportStatus},
    settings::WorkflowSettings,
    validation::validate_draft,
};

use super::{
    EventSink, ProcessingState, WorkflowError, WorkflowEvent, WorkflowState, WorkflowStatus,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

#[derive(Debug, Clone, Copy)]
pub struct ProcessingTiming {
    pub tick_interval: Duration,
    pub step: u8,
    pub completion_delay: Duration,
}

impl From<&WorkflowSettings> for ProcessingTiming {
    fn from(settings: &WorkflowSettings) -> Self {
        Self {
            tick_interval: settings.tick_interval(),
            step: settings.progress_step(),
            completion_delay: settings.completion_delay(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub status: WorkflowStatus,
    pub run_id: u64,
    pub progress: u8,
    pub status_message: Option<&'static str>,
    pub processing_visible: bool,
    pub success_visible: bool,
    pub preview_visible: bool,
    pub report_id: Option<String>,
}

impl From<&WorkflowState> for WorkflowSnapshot {
    fn from(state: &WorkflowState) -> Self {
        Self {
            status: state.status,
            run_id: state.run_id,
            progress: state.progress(),
            status_message: state.processing.map(|p| p.status.message()),
            processing_visible: state.processing_visible,
            success_visible: state.success_visible,
            preview_visible: state.preview_visible,
            report_id: state.report.as_ref().map(|report| report.id.clone()),
        }
    }
}

/// Owns the report workflow state and the ticker task that drives a run.
#[derive(Clone)]
pub struct ReportWorkflow {
    state: Arc<Mutex<WorkflowState>>,
    sink: Arc<dyn EventSink>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    timing: Arc<RwLock<ProcessingTiming>>,
}

impl ReportWorkflow {
    pub fn new(sink: Arc<dyn EventSink>, settings: &WorkflowSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(WorkflowState::new())),
            sink,
            ticker: Arc::new(Mutex::new(None)),
            timing: Arc::new(RwLock::new(ProcessingTiming::from(settings))),
        }
    }

    pub fn timing(&self) -> ProcessingTiming {
        *self.timing.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replaces the timing used by the next submission. A run already in
    /// flight finishes on the timing it started with.
    pub fn update_timing(&self, settings: &WorkflowSettings) {
        let timing = ProcessingTiming::from(settings);
        *self.timing.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = timing;
        log_debug!("Workflow timing updated: {:?}", timing);
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot::from(&*self.state.lock().await)
    }

    /// Validates the draft and starts a new run. A run already in flight is
    /// superseded: its ticker is aborted before the new one is spawned.
    pub async fn submit(&self, draft: &ReportDraft) -> Result<u64, WorkflowError> {
        let validated = match validate_draft(draft) {
            Ok(validated) => validated,
            Err(err) => {
                log_warn!("Report submission rejected: {err}");
                self.sink.emit(WorkflowEvent::ValidationFailed {
                    error: err,
                    message: err.to_string(),
                });
                return Err(err.into());
            }
        };

        let timing = self.timing();
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            if !handle.is_finished() {
                log_info!("Superseding report run still in progress");
            }
            handle.abort();
        }

        let (run_id, initial) = {
            let mut state = self.state.lock().await;
            let run_id = state.begin_run(validated);
            (run_id, state.processing.unwrap_or_default())
        };

        log_info!(
            "Started report run {} ({} step every {:?})",
            run_id,
            timing.step,
            timing.tick_interval
        );
        self.sink.emit(WorkflowEvent::ProcessingStarted { run_id });
        emit_progress(self.sink.as_ref(), run_id, initial);

        let handle = tokio::spawn(run_processing(
            run_id,
            self.state.clone(),
            self.sink.clone(),
            timing,
        ));
        *ticker_guard = Some(handle);

        Ok(run_id)
    }

    /// Closes the success confirmation and shows the generated report.
    pub async fn view_report(&self) -> Result<GeneratedReport, WorkflowError> {
        let (run_id, report) = {
            let mut state = self.state.lock().await;
            let report = state.open_preview()?;
            (state.run_id, report)
        };

        self.sink.emit(WorkflowEvent::PreviewOpened {
            run_id,
            report_id: report.id.clone(),
        });
        Ok(report)
    }

    pub async fn report_preview(&self) -> Option<GeneratedReport> {
        self.state.lock().await.previewed_report().cloned()
    }

    /// Updates the report status if `report_id` is still the workflow's report.
    pub async fn set_report_status(
        &self,
        report_id: &str,
        status: ReportStatus,
    ) -> Option<GeneratedReport> {
        let mut state = self.state.lock().await;
        if state.report.as_ref().map(|report| report.id.as_str()) != Some(report_id) {
            return None;
        }
        state.set_report_status(status)
    }

    /// Tears the workflow down as when the page unmounts.
    pub async fn dispose(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
        self.state.lock().await.reset();
        log_info!("Report workflow disposed");
        self.sink.emit(WorkflowEvent::Disposed);
    }

    pub async fn has_active_ticker(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

async fn run_processing(
    run_id: u64,
    state: Arc<Mutex<WorkflowState>>,
    sink: Arc<dyn EventSink>,
    timing: ProcessingTiming,
) {
    // First tick lands one interval after start, not immediately.
    let start = Instant::now() + timing.tick_interval;
    let mut interval = time::interval_at(start, timing.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Events are emitted while the state guard is held, so a superseded or
    // disposed run cannot emit after `ProcessingStarted` or `Disposed`.
    loop {
        interval.tick().await;

        let mut guard = state.lock().await;
        if !guard.is_current_run(run_id) {
            log_debug!("Ticker for stale run {} exiting", run_id);
            return;
        }
        let Some(processing) = guard.advance(timing.step) else {
            return;
        };
        emit_progress(sink.as_ref(), run_id, processing);

        if processing.is_finished() {
            break;
        }
    }

    time::sleep(timing.completion_delay).await;

    let mut guard = state.lock().await;
    if !guard.is_current_run(run_id) {
        return;
    }
    match guard.finish() {
        Some(report) => {
            log_info!("Report run {} completed (report {})", run_id, report.id);
            sink.emit(WorkflowEvent::Completed {
                run_id,
                report_id: report.id,
            });
        }
        None => log_error!("Report run {} ended without a report", run_id),
    }
}

fn emit_progress(sink: &dyn EventSink, run_id: u64, processing: ProcessingState) {
    sink.emit(WorkflowEvent::Progress {
        run_id,
        progress: processing.progress,
        status: processing.status,
        message: processing.status.message(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{draft::consult_date_format, ConsultType, Patient},
        validation::ValidationError,
        workflow::{ChannelSink, ProcessingStatus},
    };
    use tokio::sync::mpsc::UnboundedReceiver;

    fn workflow() -> (ReportWorkflow, UnboundedReceiver<WorkflowEvent>) {
        let (sink, rx) = ChannelSink::new();
        let workflow = ReportWorkflow::new(Arc::new(sink), &WorkflowSettings::default());
        (workflow, rx)
    }

    fn text_draft() -> ReportDraft {
        ReportDraft::new(consult_date_format::parse("2025-07-01T14:00").unwrap())
            .with_patient(Patient::new("P1", "Mariana Costa"))
            .with_consult_type(ConsultType::FollowUp)
            .with_text("paciente relata melhora")
    }

    fn drain(rx: &mut UnboundedReceiver<WorkflowEvent>) -> Vec<WorkflowEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn progress_of(events: &[WorkflowEvent], wanted: u64) -> Vec<(u8, ProcessingStatus)> {
        events
            .iter()
            .filter_map(|event| match event {
                WorkflowEvent::Progress {
                    run_id,
                    progress,
                    status,
                    ..
                } if *run_id == wanted => Some((*progress, *status)),
                _ => None,
            })
            .collect()
    }

    fn completions(events: &[WorkflowEvent]) -> Vec<u64> {
        events
            .iter()
            .filter_map(|event| match event {
                WorkflowEvent::Completed { run_id, .. } => Some(*run_id),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_draft_leaves_state_untouched() {
        let (workflow, mut rx) = workflow();
        let mut draft = text_draft();
        draft.patient = None;

        let err = workflow.submit(&draft).await.unwrap_err();
        assert_eq!(err, WorkflowError::Validation(ValidationError::MissingPatient));

        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.status, WorkflowStatus::Idle);
        assert_eq!(snapshot.run_id, 0);
        assert!(!snapshot.processing_visible);
        assert!(!workflow.has_active_ticker().await);

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![WorkflowEvent::ValidationFailed {
                error: ValidationError::MissingPatient,
                message: ValidationError::MissingPatient.to_string(),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn run_progresses_on_the_tick_cadence() {
        let (workflow, mut rx) = workflow();
        workflow.submit(&text_draft()).await.unwrap();

        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.status, WorkflowStatus::Running);
        assert_eq!(snapshot.progress, 0);
        assert!(snapshot.processing_visible);

        time::sleep(Duration::from_millis(1100)).await;
        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.progress, 25);
        assert_eq!(snapshot.status_message, Some("Analyzing content..."));

        time::sleep(Duration::from_millis(3000)).await;
        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.progress, 100);
        assert_eq!(snapshot.status, WorkflowStatus::Running, "completion delay pending");
        assert!(completions(&drain(&mut rx)).is_empty());

        time::sleep(Duration::from_millis(500)).await;
        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.status, WorkflowStatus::Done);
        assert!(!snapshot.processing_visible);
        assert!(snapshot.success_visible);
        assert_eq!(completions(&drain(&mut rx)), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_text_report() {
        let (workflow, mut rx) = workflow();
        let run_id = workflow.submit(&text_draft()).await.unwrap();

        time::sleep(Duration::from_secs(10)).await;
        let events = drain(&mut rx);

        assert_eq!(events.first(), Some(&WorkflowEvent::ProcessingStarted { run_id }));

        let progress = progress_of(&events, run_id);
        let values: Vec<u8> = progress.iter().map(|(p, _)| *p).collect();
        assert_eq!(values, (0..=100).step_by(5).collect::<Vec<u8>>());

        for (value, status) in &progress {
            let expected = match value {
                0..=30 => ProcessingStatus::AnalyzingContent,
                31..=60 => ProcessingStatus::IdentifyingClinicalInfo,
                61..=90 => ProcessingStatus::StructuringReport,
                _ => ProcessingStatus::Finalizing,
            };
            assert_eq!(*status, expected, "status at {value}");
        }

        assert_eq!(completions(&events), vec![run_id]);
        assert!(matches!(events.last(), Some(WorkflowEvent::Completed { .. })));

        let report = workflow.view_report().await.unwrap();
        assert_eq!(report.patient.id, "P1");
        assert_eq!(report.consult_type.as_str(), "Retorno");

        let snapshot = workflow.snapshot().await;
        assert!(snapshot.preview_visible);
        assert!(!snapshot.success_visible);
        assert_eq!(workflow.report_preview().await.map(|r| r.id), Some(report.id));
    }

    #[tokio::test(start_paused = true)]
    async fn view_report_before_done_is_rejected() {
        let (workflow, _rx) = workflow();
        assert_eq!(
            workflow.view_report().await.unwrap_err(),
            WorkflowError::ReportNotReady
        );

        workflow.submit(&text_draft()).await.unwrap();
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(
            workflow.view_report().await.unwrap_err(),
            WorkflowError::ReportNotReady
        );
        assert!(workflow.report_preview().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn resubmitting_mid_run_keeps_a_single_ticker() {
        let (workflow, mut rx) = workflow();
        let first = workflow.submit(&text_draft()).await.unwrap();
        time::sleep(Duration::from_millis(1100)).await;

        let second = workflow.submit(&text_draft()).await.unwrap();
        assert_eq!(second, first + 1);
        assert_eq!(workflow.snapshot().await.progress, 0);

        time::sleep(Duration::from_secs(10)).await;
        let events = drain(&mut rx);

        let first_progress = progress_of(&events, first);
        assert_eq!(first_progress.last().map(|(p, _)| *p), Some(25));

        let restart = events
            .iter()
            .position(|e| *e == WorkflowEvent::ProcessingStarted { run_id: second })
            .unwrap();
        assert!(
            progress_of(&events[restart..], first).is_empty(),
            "superseded run kept ticking"
        );

        let second_values: Vec<u8> = progress_of(&events, second).iter().map(|(p, _)| *p).collect();
        assert_eq!(second_values, (0..=100).step_by(5).collect::<Vec<u8>>());
        assert_eq!(completions(&events), vec![second]);
        assert!(!workflow.has_active_ticker().await);
    }

    #[tokio::test(start_paused = true)]
    async fn resubmitting_after_done_restarts_the_run() {
        let (workflow, mut rx) = workflow();
        workflow.submit(&text_draft()).await.unwrap();
        time::sleep(Duration::from_secs(10)).await;
        workflow.view_report().await.unwrap();

        let second = workflow.submit(&text_draft()).await.unwrap();
        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.status, WorkflowStatus::Running);
        assert!(!snapshot.preview_visible);
        assert_eq!(snapshot.report_id, None);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(completions(&drain(&mut rx)), vec![1, second]);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_stops_the_ticker() {
        let (workflow, mut rx) = workflow();
        workflow.submit(&text_draft()).await.unwrap();
        time::sleep(Duration::from_millis(1100)).await;

        workflow.dispose().await;
        assert!(!workflow.has_active_ticker().await);

        time::sleep(Duration::from_secs(10)).await;
        let events = drain(&mut rx);
        assert!(completions(&events).is_empty());
        assert_eq!(events.last(), Some(&WorkflowEvent::Disposed));

        let snapshot = workflow.snapshot().await;
        assert_eq!(snapshot.status, WorkflowStatus::Idle);
        assert_eq!(snapshot.progress, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn uneven_step_still_lands_on_one_hundred_once() {
        let (sink, mut rx) = ChannelSink::new();
        let settings = WorkflowSettings {
            progress_step: 7,
            ..WorkflowSettings::default()
        };
        let workflow = ReportWorkflow::new(Arc::new(sink), &settings);
        let run_id = workflow.submit(&text_draft()).await.unwrap();

        time::sleep(Duration::from_secs(10)).await;
        let events = drain(&mut rx);
        let values: Vec<u8> = progress_of(&events, run_id).iter().map(|(p, _)| *p).collect();

        assert_eq!(values.first(), Some(&0));
        assert_eq!(values.last(), Some(&100));
        assert_eq!(values.iter().filter(|v| **v == 100).count(), 1);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(completions(&events), vec![run_id]);
    }

    #[tokio::test(start_paused = true)]
    async fn timing_updates_apply_to_the_next_run() {
        let (workflow, _rx) = workflow();
        workflow.submit(&text_draft()).await.unwrap();
        time::sleep(Duration::from_millis(250)).await;
        assert_eq!(workflow.snapshot().await.progress, 5);

        workflow.update_timing(&WorkflowSettings {
            progress_step: 50,
            ..WorkflowSettings::default()
        });
        assert_eq!(workflow.timing().step, 50);

        // The run in flight keeps the step it started with.
        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(workflow.snapshot().await.progress, 10);

        workflow.submit(&text_draft()).await.unwrap();
        time::sleep(Duration::from_millis(250)).await;
        assert_eq!(workflow.snapshot().await.progress, 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn stale_runs_never_emit_after_restart_or_dispose() {
        let (sink, mut rx) = ChannelSink::new();
        let settings = WorkflowSettings {
            tick_interval_ms: 1,
            completion_delay_ms: 0,
            ..WorkflowSettings::default()
        };
        let workflow = ReportWorkflow::new(Arc::new(sink), &settings);

        for round in 0..40u64 {
            workflow.submit(&text_draft()).await.unwrap();
            time::sleep(Duration::from_millis(round % 7)).await;
        }
        workflow.dispose().await;
        time::sleep(Duration::from_millis(50)).await;

        let mut current = None;
        let mut disposed = false;
        for event in drain(&mut rx) {
            match event {
                WorkflowEvent::ProcessingStarted { run_id } => current = Some(run_id),
                WorkflowEvent::Disposed => disposed = true,
                WorkflowEvent::Progress { run_id, .. }
                | WorkflowEvent::Completed { run_id, .. } => {
                    assert!(!disposed, "run {run_id} emitted after dispose");
                    assert_eq!(Some(run_id), current, "superseded run emitted");
                }
                _ => {}
            }
        }
        assert!(disposed);
    }
}
