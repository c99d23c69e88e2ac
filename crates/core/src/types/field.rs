//! Contact form fields and their length ceilings.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A user-editable field of the contact form.
///
/// Serializes to the camelCase name used on the wire, which is also the
/// value reported in a `400 { field }` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Email,
    SystemInScope,
    PrimaryConstraint,
    Context,
}

impl Field {
    /// Required fields, in the order they are validated.
    pub const REQUIRED: [Self; 4] = [
        Self::Name,
        Self::Email,
        Self::SystemInScope,
        Self::PrimaryConstraint,
    ];

    /// Every field, in form order.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Email,
        Self::SystemInScope,
        Self::PrimaryConstraint,
        Self::Context,
    ];

    /// Maximum accepted length in characters.
    #[must_use]
    pub const fn max_len(self) -> usize {
        match self {
            Self::Name => 120,
            Self::Email => crate::Email::MAX_LENGTH,
            Self::SystemInScope | Self::PrimaryConstraint => 200,
            Self::Context => 4000,
        }
    }

    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::SystemInScope => "systemInScope",
            Self::PrimaryConstraint => "primaryConstraint",
            Self::Context => "context",
        }
    }

    /// Human-readable label used in emails and client messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::SystemInScope => "System in scope",
            Self::PrimaryConstraint => "Primary constraint",
            Self::Context => "Context",
        }
    }

    /// Whether the field must be present and non-blank.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::Context)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim `value` and cut it to at most `max` characters.
///
/// Cuts on a character boundary, so multi-byte input never panics or
/// produces invalid UTF-8.
#[must_use]
pub fn clamp(value: &str, max: usize) -> String {
    let trimmed = value.trim();
    match trimmed.char_indices().nth(max) {
        Some((cut, _)) => trimmed[..cut].trim_end().to_owned(),
        None => trimmed.to_owned(),
    }
}
