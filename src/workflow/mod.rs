pub mod commands;
pub mod controller;
pub mod events;
pub mod state;

use thiserror::Error;

use crate::validation::ValidationError;

pub use controller::{ProcessingTiming, ReportWorkflow, WorkflowSnapshot};
pub use events::{ChannelSink, EventSink, LogSink, WorkflowEvent};
pub use state::{ProcessingState, ProcessingStatus, WorkflowState, WorkflowStatus, MAX_PROGRESS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("the report has not finished processing yet")]
    ReportNotReady,
}
