use log::{info, warn};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    actions::{ActionKind, ActionState},
    validation::ValidationError,
};

use super::ProcessingStatus;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WorkflowEvent {
    ValidationFailed {
        error: ValidationError,
        message: String,
    },
    ProcessingStarted {
        run_id: u64,
    },
    Progress {
        run_id: u64,
        progress: u8,
        status: ProcessingStatus,
        message: &'static str,
    },
    Completed {
        run_id: u64,
        report_id: String,
    },
    PreviewOpened {
        run_id: u64,
        report_id: String,
    },
    ActionStateChanged {
        action: ActionKind,
        state: ActionState,
        label: &'static str,
    },
    ReportFinalized {
        report_id: String,
    },
    Disposed,
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::ValidationFailed { .. } => "report-validation-failed",
            WorkflowEvent::ProcessingStarted { .. } => "report-processing-started",
            WorkflowEvent::Progress { .. } => "report-progress",
            WorkflowEvent::Completed { .. } => "report-completed",
            WorkflowEvent::PreviewOpened { .. } => "report-preview-opened",
            WorkflowEvent::ActionStateChanged { .. } => "report-action-state-changed",
            WorkflowEvent::ReportFinalized { .. } => "report-finalized",
            WorkflowEvent::Disposed => "report-workflow-disposed",
        }
    }
}

/// Where workflow events go: a UI bridge, a channel, the log.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: WorkflowEvent);
}

pub struct ChannelSink {
    sender: mpsc::UnboundedSender<WorkflowEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WorkflowEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: WorkflowEvent) {
        // Receiver gone means nobody is listening anymore.
        let _ = self.sender.send(event);
    }
}

pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: WorkflowEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => info!("{}: {}", event.name(), payload),
            Err(err) => warn!("failed to serialize {}: {err}", event.name()),
        }
    }
}
