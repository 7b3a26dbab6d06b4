use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{draft::consult_date_format, ConsultType, Patient};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ReportStatus {
    #[default]
    Processing,
    Draft,
    Completed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Processing => "Processing",
            ReportStatus::Draft => "Draft",
            ReportStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "content", rename_all = "camelCase")]
pub enum SectionBody {
    Paragraph(String),
    Bullets(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSection {
    pub title: String,
    pub body: SectionBody,
}

/// Clinical note produced when processing finishes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReport {
    pub id: String,
    pub patient: Patient,
    pub consult_type: ConsultType,
    #[serde(with = "consult_date_format")]
    pub consult_date: NaiveDateTime,
    pub sections: Vec<ReportSection>,
    pub status: ReportStatus,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedReport {
    pub fn section(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|section| section.title == title)
    }
}
