use serde::Serialize;

/// Result of a completion attempt. `Degraded` carries the canned text that
/// was substituted for a failed or skipped upstream call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatOutcome {
    Answered(String),
    Degraded { text: String, reason: String },
}

impl ChatOutcome {
    pub fn into_text(self) -> String {
        match self {
            Self::Answered(text) => text,
            Self::Degraded { text, .. } => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}
