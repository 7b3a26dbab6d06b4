//! Read-only rendering of the clinical note shown once processing is done.

pub mod template;

use std::fmt::Write;

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::{
    models::{GeneratedReport, ReportStatus, SectionBody},
    validation::ValidatedDraft,
};

pub use template::SECTION_ORDER;

pub const PREVIEW_DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

pub fn build_report(draft: &ValidatedDraft) -> GeneratedReport {
    GeneratedReport {
        id: Uuid::new_v4().to_string(),
        patient: draft.patient.clone(),
        consult_type: draft.consult_type,
        consult_date: draft.consult_date,
        sections: template::clinical_note_sections(),
        status: ReportStatus::Processing,
        generated_at: Utc::now(),
    }
}

pub fn format_consult_date(value: &NaiveDateTime) -> String {
    value.format(PREVIEW_DATE_FORMAT).to_string()
}

/// Plain-text rendering: patient header first, then each section.
pub fn render_text(report: &GeneratedReport) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "Patient data");
    let _ = writeln!(out, "  Name: {}", report.patient.name);
    let _ = writeln!(out, "  ID: {}", report.patient.id);
    let _ = writeln!(
        out,
        "  Consult date: {}",
        format_consult_date(&report.consult_date)
    );
    let _ = writeln!(out, "  Consult type: {}", report.consult_type);

    for section in &report.sections {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", section.title);
        match &section.body {
            SectionBody::Paragraph(text) => {
                let _ = writeln!(out, "  {text}");
            }
            SectionBody::Bullets(items) => {
                for item in items {
                    let _ = writeln!(out, "  - {item}");
                }
            }
        }
    }

    out
}
