//! Contact submission wire types.
//!
//! [`ContactRequest`] is what the browser (or CLI) posts; it is untrusted and
//! every field is optional. [`ContactSubmission`] is the validated, trimmed
//! and clamped form that is allowed to reach outbound email.
//! [`ContactResponse`] is the JSON body returned for every outcome.

use serde::{Deserialize, Serialize};

use super::{Email, Field};

/// Raw contact form payload as posted to `POST /api/contact`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_in_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_constraint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Honeypot. Hidden from humans; anything here means a bot filled it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honey: Option<String>,
    /// Client mount time in milliseconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mounted_at: Option<f64>,
}

impl ContactRequest {
    /// Raw value of a field, if the client sent one.
    #[must_use]
    pub fn value(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::SystemInScope => self.system_in_scope.as_deref(),
            Field::PrimaryConstraint => self.primary_constraint.as_deref(),
            Field::Context => self.context.as_deref(),
        }
    }

    /// Mount timestamp truncated to whole milliseconds.
    ///
    /// Non-finite values are treated as absent.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Saturating float-to-int cast is the intent
    pub fn mounted_at_ms(&self) -> Option<i64> {
        self.mounted_at
            .filter(|ms| ms.is_finite())
            .map(|ms| ms as i64)
    }
}

/// A contact submission that passed validation and sanitization.
///
/// Every string is trimmed and clamped to [`Field::max_len`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: Email,
    pub system_in_scope: String,
    pub primary_constraint: String,
    pub context: Option<String>,
    pub mounted_at: Option<i64>,
}

/// JSON body returned by `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContactResponse {
    /// `{ ok: true }`
    #[must_use]
    pub const fn accepted() -> Self {
        Self {
            ok: true,
            field: None,
            error: None,
        }
    }

    /// `{ ok: false }`
    #[must_use]
    pub const fn failed() -> Self {
        Self {
            ok: false,
            field: None,
            error: None,
        }
    }

    /// `{ ok: false, field }`
    #[must_use]
    pub const fn invalid_field(field: Field) -> Self {
        Self {
            ok: false,
            field: Some(field),
            error: None,
        }
    }

    /// `{ ok: false, error }`
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            field: None,
            error: Some(message.into()),
        }
    }
}
