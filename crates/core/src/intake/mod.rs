//! Server-side intake pipeline for contact submissions.
//!
//! [`screen`] runs the anti-spam gate and then the validator, and reports a
//! tagged [`IntakeOutcome`]. Nothing here performs I/O; the HTTP layer decides
//! how each outcome is rendered, and is the only place where a silently
//! discarded submission is made to look like an accepted one.

pub mod spam;
pub mod validate;

pub use spam::{DEFAULT_MIN_FILL_TIME, SpamPolicy, SpamVerdict};
pub use validate::validate;

use crate::types::{ContactRequest, ContactSubmission, Field};

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Submitted sooner after mount than the policy allows.
    TooFast { elapsed_ms: i64 },
    /// A required field was missing, blank, or malformed.
    InvalidField(Field),
}

/// Result of screening one contact request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// Passed every check; safe to dispatch.
    Accepted {
        submission: ContactSubmission,
        /// Measured time-to-submit, when the client sent a mount time.
        elapsed_ms: Option<i64>,
    },
    /// Caught by the honeypot. Must not be dispatched.
    SilentlyDiscarded,
    /// Refused with a reason the client is told about.
    Rejected(Rejection),
}

/// Screen a raw request: honeypot, then timing, then field validation.
#[must_use]
pub fn screen(request: &ContactRequest, policy: &SpamPolicy, now_ms: i64) -> IntakeOutcome {
    let elapsed_ms = match policy.check(request, now_ms) {
        SpamVerdict::Honeypot => return IntakeOutcome::SilentlyDiscarded,
        SpamVerdict::TooFast { elapsed_ms } => {
            return IntakeOutcome::Rejected(Rejection::TooFast { elapsed_ms });
        }
        SpamVerdict::Clean { elapsed_ms } => elapsed_ms,
    };

    match validate(request) {
        Ok(submission) => IntakeOutcome::Accepted {
            submission,
            elapsed_ms,
        },
        Err(field) => IntakeOutcome::Rejected(Rejection::InvalidField(field)),
    }
}
