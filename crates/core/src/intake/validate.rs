//! Intake validation and sanitization.

use crate::types::{ContactRequest, ContactSubmission, Email, Field, clamp};

/// Validate a raw request and produce a sanitized submission.
///
/// Required fields are checked in [`Field::REQUIRED`] order and the first
/// failure is returned. A field fails when it is missing or blank after
/// trimming; `email` additionally fails when it does not parse as an
/// [`Email`]. Accepted values are trimmed and clamped to their ceilings.
///
/// # Errors
///
/// Returns the first [`Field`] that failed validation.
pub fn validate(request: &ContactRequest) -> Result<ContactSubmission, Field> {
    for field in Field::REQUIRED {
        let value = request.value(field).map(str::trim).unwrap_or_default();
        if value.is_empty() {
            return Err(field);
        }
        if field == Field::Email && Email::parse(value).is_err() {
            return Err(field);
        }
    }

    sanitize(request).ok_or(Field::Email)
}

/// Trim and clamp every field of an already-validated request.
fn sanitize(request: &ContactRequest) -> Option<ContactSubmission> {
    let text = |field: Field| clamp(request.value(field).unwrap_or_default(), field.max_len());

    let email = Email::parse(request.value(Field::Email)?.trim()).ok()?;
    let context = Some(text(Field::Context)).filter(|c| !c.is_empty());

    Some(ContactSubmission {
        name: text(Field::Name),
        email,
        system_in_scope: text(Field::SystemInScope),
        primary_constraint: text(Field::PrimaryConstraint),
        context,
        mounted_at: request.mounted_at_ms(),
    })
}
