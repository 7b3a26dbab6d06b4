use serde::{Deserialize, Serialize};

use crate::{
    models::{GeneratedReport, ReportStatus},
    preview::build_report,
    validation::ValidatedDraft,
};

use super::WorkflowError;

pub const MAX_PROGRESS: u8 = 100;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowStatus {
    #[default]
    Idle,
    Running,
    Done,
}

/// Status line shown under the progress bar; each variant covers a fixed
/// progress bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum ProcessingStatus {
    AnalyzingContent,
    IdentifyingClinicalInfo,
    StructuringReport,
    Finalizing,
}

impl ProcessingStatus {
    pub fn for_progress(progress: u8) -> Self {
        match progress {
            0..=30 => ProcessingStatus::AnalyzingContent,
            31..=60 => ProcessingStatus::IdentifyingClinicalInfo,
            61..=90 => ProcessingStatus::StructuringReport,
            _ => ProcessingStatus::Finalizing,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ProcessingStatus::AnalyzingContent => "Analyzing content...",
            ProcessingStatus::IdentifyingClinicalInfo => "Identifying clinical information...",
            ProcessingStatus::StructuringReport => "Structuring report...",
            ProcessingStatus::Finalizing => "Finalizing...",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingState {
    pub progress: u8,
    pub status: ProcessingStatus,
}

impl Default for ProcessingState {
    fn default() -> Self {
        Self {
            progress: 0,
            status: ProcessingStatus::for_progress(0),
        }
    }
}

impl ProcessingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves forward by `step`, saturating at [`MAX_PROGRESS`].
    pub fn advance(&mut self, step: u8) -> u8 {
        self.progress = self.progress.saturating_add(step).min(MAX_PROGRESS);
        self.status = ProcessingStatus::for_progress(self.progress);
        self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= MAX_PROGRESS
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowState {
    pub status: WorkflowStatus,
    /// Bumped on every submission; a ticker only touches the run it was spawned for.
    pub run_id: u64,
    pub processing: Option<ProcessingState>,
    pub processing_visible: bool,
    pub success_visible: bool,
    pub preview_visible: bool,
    pub draft: Option<ValidatedDraft>,
    pub report: Option<GeneratedReport>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_run(&mut self, draft: ValidatedDraft) -> u64 {
        let run_id = self.run_id.wrapping_add(1);
        *self = Self {
            status: WorkflowStatus::Running,
            run_id,
            processing: Some(ProcessingState::new()),
            processing_visible: true,
            success_visible: false,
            preview_visible: false,
            draft: Some(draft),
            report: None,
        };
        run_id
    }

    pub fn is_current_run(&self, run_id: u64) -> bool {
        self.run_id == run_id && self.status == WorkflowStatus::Running
    }

    pub fn advance(&mut self, step: u8) -> Option<ProcessingState> {
        if self.status != WorkflowStatus::Running {
            return None;
        }
        let processing = self.processing.as_mut()?;
        if processing.is_finished() {
            return None;
        }
        processing.advance(step);
        Some(*processing)
    }

    /// Closes the processing indicator and opens the success confirmation.
    /// Returns `None` unless the current run has reached full progress.
    pub fn finish(&mut self) -> Option<GeneratedReport> {
        if self.status != WorkflowStatus::Running {
            return None;
        }
        if !self.processing.map(|p| p.is_finished()).unwrap_or(false) {
            return None;
        }
        let report = build_report(self.draft.as_ref()?);

        self.status = WorkflowStatus::Done;
        self.processing = None;
        self.processing_visible = false;
        self.success_visible = true;
        self.report = Some(report.clone());
        Some(report)
    }

    pub fn open_preview(&mut self) -> Result<GeneratedReport, WorkflowError> {
        if self.status != WorkflowStatus::Done {
            return Err(WorkflowError::ReportNotReady);
        }
        let report = self.report.clone().ok_or(WorkflowError::ReportNotReady)?;
        self.success_visible = false;
        self.preview_visible = true;
        Ok(report)
    }

    pub fn previewed_report(&self) -> Option<&GeneratedReport> {
        self.report.as_ref().filter(|_| self.preview_visible)
    }

    pub fn set_report_status(&mut self, status: ReportStatus) -> Option<GeneratedReport> {
        let report = self.report.as_mut()?;
        report.status = status;
        Some(report.clone())
    }

    pub fn progress(&self) -> u8 {
        match (self.status, self.processing) {
            (_, Some(processing)) => processing.progress,
            (WorkflowStatus::Done, None) => MAX_PROGRESS,
            _ => 0,
        }
    }

    /// Back to idle, keeping the run counter so stale tickers stay stale.
    pub fn reset(&mut self) {
        let run_id = self.run_id;
        *self = Self {
            run_id,
            ..Self::default()
        };
    }
}
