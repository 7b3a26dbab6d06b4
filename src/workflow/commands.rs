use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    models::{draft::consult_date_format, AudioFile, GeneratedReport, InputMode, ReportDraft},
    preview::render_text,
    validation::admit_audio,
    workflow::{ReportWorkflow, WorkflowSnapshot},
    AppState,
};

/// Form values as the frontend sends them; patient and consult type are
/// references that still need resolving.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftInput {
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub consult_type: Option<String>,
    #[serde(default)]
    pub consult_date: Option<String>,
    #[serde(default)]
    pub input_mode: InputMode,
    #[serde(default)]
    pub audio_file: Option<AudioFile>,
    #[serde(default)]
    pub text_content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPreview {
    pub report: GeneratedReport,
    pub text: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

pub fn resolve_draft(state: &AppState, input: DraftInput) -> Result<ReportDraft> {
    let mut draft = match non_blank(input.consult_date) {
        Some(raw) => ReportDraft::new(
            consult_date_format::parse(&raw)
                .with_context(|| format!("invalid consult date '{raw}'"))?,
        ),
        None => ReportDraft::default(),
    };

    if let Some(patient_id) = non_blank(input.patient_id) {
        let patient = state
            .repository
            .find_patient(&patient_id)?
            .ok_or_else(|| anyhow!("unknown patient '{patient_id}'"))?;
        draft.patient = Some(patient);
    }

    if let Some(consult_type) = non_blank(input.consult_type) {
        draft.consult_type = Some(consult_type.parse()?);
    }

    draft.input_mode = input.input_mode;
    if let Some(text) = input.text_content {
        draft.text_content = Some(text);
    }
    if let Some(file) = input.audio_file {
        draft.audio_file = Some(admit_audio(file)?);
    }

    Ok(draft)
}

fn controller_from_state(state: &AppState) -> ReportWorkflow {
    state.workflow.clone()
}

pub fn attach_audio(file: AudioFile) -> Result<AudioFile, String> {
    admit_audio(file).map_err(|e| e.to_string())
}

pub async fn submit_report(
    state: &AppState,
    input: DraftInput,
) -> Result<WorkflowSnapshot, String> {
    let draft = resolve_draft(state, input).map_err(|e| e.to_string())?;
    let controller = controller_from_state(state);
    controller.submit(&draft).await.map_err(|e| e.to_string())?;
    Ok(controller.snapshot().await)
}

pub async fn get_workflow_state(state: &AppState) -> Result<WorkflowSnapshot, String> {
    Ok(controller_from_state(state).snapshot().await)
}

pub async fn view_report(state: &AppState) -> Result<RenderedPreview, String> {
    let report = controller_from_state(state)
        .view_report()
        .await
        .map_err(|e| e.to_string())?;
    Ok(RenderedPreview {
        text: render_text(&report),
        report,
    })
}

pub async fn get_report_preview(state: &AppState) -> Result<Option<RenderedPreview>, String> {
    let preview = controller_from_state(state)
        .report_preview()
        .await
        .map(|report| RenderedPreview {
            text: render_text(&report),
            report,
        });
    Ok(preview)
}

pub async fn dispose_workflow(state: &AppState) -> Result<(), String> {
    state.actions.dispose().await;
    controller_from_state(state).dispose().await;
    Ok(())
}
