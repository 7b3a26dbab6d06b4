use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
}

impl Patient {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Kind of consultation a report is written for. Serialized with the labels
/// the dashboard shows in its dropdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ConsultType {
    #[serde(rename = "Primeira consulta")]
    FirstVisit,
    #[serde(rename = "Retorno")]
    FollowUp,
    #[serde(rename = "Avaliação")]
    Assessment,
    #[serde(rename = "Acompanhamento")]
    Monitoring,
    #[serde(rename = "Laudo")]
    MedicalOpinion,
}

impl ConsultType {
    pub const ALL: [ConsultType; 5] = [
        ConsultType::FirstVisit,
        ConsultType::FollowUp,
        ConsultType::Assessment,
        ConsultType::Monitoring,
        ConsultType::MedicalOpinion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultType::FirstVisit => "Primeira consulta",
            ConsultType::FollowUp => "Retorno",
            ConsultType::Assessment => "Avaliação",
            ConsultType::Monitoring => "Acompanhamento",
            ConsultType::MedicalOpinion => "Laudo",
        }
    }
}

impl fmt::Display for ConsultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsultType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        ConsultType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| anyhow!("unknown consult type '{value}'"))
    }
}
