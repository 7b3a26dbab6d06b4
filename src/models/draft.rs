use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::{ConsultType, Patient};
use crate::validation::{admit_audio, AudioRejected};

/// Text the consult editor shows when nothing has been typed yet.
pub const TEXT_PLACEHOLDER: &str = "Digite ou cole o texto da consulta aqui...";

/// Largest audio upload accepted (100 MiB).
pub const MAX_AUDIO_BYTES: usize = 100 * 1024 * 1024;

/// Format of the datetime-local form value, e.g. `2025-07-01T14:00`.
pub const CONSULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum InputMode {
    #[default]
    Audio,
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AudioFile {
    pub file_name: String,
    pub content_type: String,
    #[serde(default)]
    pub data: Vec<u8>,
}

impl AudioFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Unsaved report request as the form holds it before processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    pub patient: Option<Patient>,
    pub consult_type: Option<ConsultType>,
    #[serde(with = "consult_date_format")]
    pub consult_date: NaiveDateTime,
    #[serde(default)]
    pub input_mode: InputMode,
    #[serde(default)]
    pub audio_file: Option<AudioFile>,
    #[serde(default)]
    pub text_content: Option<String>,
}

impl Default for ReportDraft {
    fn default() -> Self {
        let now = Local::now().naive_local();
        let consult_date = now
            .with_second(0)
            .and_then(|value| value.with_nanosecond(0))
            .unwrap_or(now);

        Self::new(consult_date)
    }
}

impl ReportDraft {
    pub fn new(consult_date: NaiveDateTime) -> Self {
        Self {
            patient: None,
            consult_type: None,
            consult_date,
            input_mode: InputMode::Audio,
            audio_file: None,
            text_content: Some(TEXT_PLACEHOLDER.to_string()),
        }
    }

    pub fn with_patient(mut self, patient: Patient) -> Self {
        self.patient = Some(patient);
        self
    }

    pub fn with_consult_type(mut self, consult_type: ConsultType) -> Self {
        self.consult_type = Some(consult_type);
        self
    }

    /// Switches the draft to text input with the given content.
    pub fn with_text(mut self, content: impl Into<String>) -> Self {
        self.input_mode = InputMode::Text;
        self.text_content = Some(content.into());
        self
    }

    /// Switches the draft to audio input, admitting the file first.
    pub fn with_audio(mut self, file: AudioFile) -> Result<Self, AudioRejected> {
        self.attach_audio(file)?;
        Ok(self)
    }

    pub fn attach_audio(&mut self, file: AudioFile) -> Result<(), AudioRejected> {
        let file = admit_audio(file)?;
        self.input_mode = InputMode::Audio;
        self.audio_file = Some(file);
        Ok(())
    }

    pub fn remove_audio(&mut self) {
        self.audio_file = None;
    }

    /// Text the user actually entered, ignoring whitespace and the placeholder.
    pub fn entered_text(&self) -> Option<&str> {
        self.text_content
            .as_deref()
            .filter(|text| !text.trim().is_empty() && *text != TEXT_PLACEHOLDER)
    }
}

pub mod consult_date_format {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::CONSULT_DATE_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(CONSULT_DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    /// Accepts the form value with or without seconds.
    pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw, CONSULT_DATE_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
    }
}
