pub mod draft;
pub mod patient;
pub mod report;

pub use draft::{AudioFile, InputMode, ReportDraft, MAX_AUDIO_BYTES, TEXT_PLACEHOLDER};
pub use patient::{ConsultType, Patient};
pub use report::{GeneratedReport, ReportSection, ReportStatus, SectionBody};
