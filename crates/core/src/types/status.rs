//! Client-side submission status.

use serde::{Deserialize, Serialize};

/// Status of one mounted contact form.
///
/// ```text
/// Idle ──▶ Submitting ──▶ Success (terminal)
///              │  ▲
///              ▼  │
///             Error
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error {
        /// Banner text shown to the user.
        message: String,
    },
}

impl SubmissionStatus {
    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub const fn can_transition_to(&self, next: &Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle | Self::Error { .. }, Self::Submitting)
                | (Self::Submitting, Self::Success | Self::Error { .. })
        )
    }

    /// Whether the submit affordance should be enabled.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        matches!(self, Self::Idle | Self::Error { .. })
    }

    /// Whether no further transitions are possible for this mount.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Short name of the state, for logs and UI hooks.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Error { .. } => "error",
        }
    }
}
