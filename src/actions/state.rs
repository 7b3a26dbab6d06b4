use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    SaveDraft,
    Finalize,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SaveDraft => "save draft",
            ActionKind::Finalize => "finalize report",
        }
    }

    /// Button caption for each state.
    pub fn label(&self, state: ActionState) -> &'static str {
        match (self, state) {
            (ActionKind::SaveDraft, ActionState::Idle) => "Save draft",
            (ActionKind::SaveDraft, ActionState::Busy) => "Saving...",
            (ActionKind::SaveDraft, ActionState::Done) => "Saved!",
            (ActionKind::Finalize, ActionState::Idle) => "Finalize report",
            (ActionKind::Finalize, ActionState::Busy) => "Finalizing...",
            (ActionKind::Finalize, ActionState::Done) => "Finalized!",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ActionState {
    #[default]
    Idle,
    Busy,
    Done,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionStates {
    pub save_draft: ActionState,
    pub finalize: ActionState,
}

impl ActionStates {
    pub fn get(&self, kind: ActionKind) -> ActionState {
        match kind {
            ActionKind::SaveDraft => self.save_draft,
            ActionKind::Finalize => self.finalize,
        }
    }

    pub fn set(&mut self, kind: ActionKind, state: ActionState) {
        match kind {
            ActionKind::SaveDraft => self.save_draft = state,
            ActionKind::Finalize => self.finalize = state,
        }
    }
}
