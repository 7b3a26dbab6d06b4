//! Gate a draft must pass before processing starts.
//!
//! Rules run in a fixed order and the first failure wins: patient, consult type,
//! then the content of whichever input mode is selected.

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::models::{AudioFile, ConsultType, InputMode, Patient, ReportDraft, MAX_AUDIO_BYTES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationError {
    #[error("select a patient before processing the report")]
    MissingPatient,
    #[error("select the consult type before processing the report")]
    MissingConsultType,
    #[error("upload an audio file before processing the report")]
    MissingAudio,
    #[error("enter the consult text before processing the report")]
    MissingText,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioRejected {
    #[error("audio file is too large ({size} bytes); the maximum is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
}

/// What the user fed the workflow, once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsultSource {
    Audio { file_name: String, size_bytes: usize },
    Text { content: String },
}

/// A draft that passed [`validate_draft`]; every required field is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    pub patient: Patient,
    pub consult_type: ConsultType,
    pub consult_date: NaiveDateTime,
    pub source: ConsultSource,
}

pub fn validate_draft(draft: &ReportDraft) -> Result<ValidatedDraft, ValidationError> {
    let patient = draft
        .patient
        .clone()
        .ok_or(ValidationError::MissingPatient)?;
    let consult_type = draft.consult_type.ok_or(ValidationError::MissingConsultType)?;

    let source = match draft.input_mode {
        InputMode::Audio => {
            let file = draft
                .audio_file
                .as_ref()
                .ok_or(ValidationError::MissingAudio)?;
            ConsultSource::Audio {
                file_name: file.file_name.clone(),
                size_bytes: file.size_bytes(),
            }
        }
        InputMode::Text => {
            let content = draft.entered_text().ok_or(ValidationError::MissingText)?;
            ConsultSource::Text {
                content: content.to_string(),
            }
        }
    };

    Ok(ValidatedDraft {
        patient,
        consult_type,
        consult_date: draft.consult_date,
        source,
    })
}

/// Upload-time check for audio files; a rejected file is never attached.
pub fn admit_audio(file: AudioFile) -> Result<AudioFile, AudioRejected> {
    let size = file.size_bytes();
    if size > MAX_AUDIO_BYTES {
        return Err(AudioRejected::TooLarge {
            size,
            limit: MAX_AUDIO_BYTES,
        });
    }
    Ok(file)
}
