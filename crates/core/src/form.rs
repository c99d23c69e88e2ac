//! Client-side contact form controller.
//!
//! [`ContactForm`] holds what the visitor typed, the time the form was
//! mounted (for the server's time-to-submit check), and the
//! [`SubmissionStatus`] state machine. It performs no I/O: the caller posts
//! the payload returned by [`ContactForm::begin_submit`] and reports back via
//! [`ContactForm::finish`].

use thiserror::Error;

use crate::types::{ContactRequest, ContactResponse, Field, SubmissionStatus};

/// Shown when the server answered non-OK without a usable message.
pub const GENERIC_ERROR_MESSAGE: &str =
    "Something went wrong sending your message. Please try again, or email us directly.";

/// Shown when the request never reached the server.
pub const NETWORK_ERROR_MESSAGE: &str =
    "We couldn't reach the server. Check your connection, or email us directly.";

/// Errors raised by the form controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// The only field gated before the network call.
    #[error("primary constraint is required")]
    MissingPrimaryConstraint,
    /// The requested status change is not allowed from the current state.
    #[error("cannot move from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

/// What happened to a submission attempt, as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// 2xx response.
    Ok,
    /// Non-2xx response, with the parsed body if it was JSON.
    Rejected {
        status: u16,
        body: Option<ContactResponse>,
    },
    /// The request failed before any response arrived.
    Network(String),
}

/// State of one mounted contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    name: String,
    email: String,
    system_in_scope: String,
    primary_constraint: String,
    context: String,
    honey: String,
    mounted_at_ms: i64,
    status: SubmissionStatus,
}

impl ContactForm {
    /// Mount a fresh, empty form at `now_ms` (milliseconds since the Unix epoch).
    #[must_use]
    pub fn mount(now_ms: i64) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            system_in_scope: String::new(),
            primary_constraint: String::new(),
            context: String::new(),
            honey: String::new(),
            mounted_at_ms: now_ms,
            status: SubmissionStatus::Idle,
        }
    }

    /// Replace the value of a field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot(field) = value.into();
    }

    /// Current value of a field.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::SystemInScope => &self.system_in_scope,
            Field::PrimaryConstraint => &self.primary_constraint,
            Field::Context => &self.context,
        }
    }

    /// Fill the hidden honeypot field. Only automated clients do this.
    pub fn set_honey(&mut self, value: impl Into<String>) {
        self.honey = value.into();
    }

    #[must_use]
    pub const fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    #[must_use]
    pub const fn mounted_at_ms(&self) -> i64 {
        self.mounted_at_ms
    }

    /// Whether the submit affordance should be enabled.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        self.status.can_submit()
    }

    /// Start a submission and return the JSON payload to post.
    ///
    /// # Errors
    ///
    /// - [`FormError::MissingPrimaryConstraint`] if the primary constraint is
    ///   blank; the status is left unchanged.
    /// - [`FormError::InvalidTransition`] if a request is already in flight
    ///   or the form has already succeeded.
    pub fn begin_submit(&mut self) -> Result<ContactRequest, FormError> {
        if self.primary_constraint.trim().is_empty() {
            return Err(FormError::MissingPrimaryConstraint);
        }
        self.transition(SubmissionStatus::Submitting)?;
        Ok(self.payload())
    }

    /// Record the result of the in-flight submission.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidTransition`] if no submission is in flight.
    pub fn finish(&mut self, result: SubmitResult) -> Result<&SubmissionStatus, FormError> {
        let next = match result {
            SubmitResult::Ok => SubmissionStatus::Success,
            SubmitResult::Rejected { body, .. } => SubmissionStatus::Error {
                message: rejection_message(body.as_ref()),
            },
            SubmitResult::Network(_) => SubmissionStatus::Error {
                message: NETWORK_ERROR_MESSAGE.to_string(),
            },
        };
        self.transition(next)?;
        Ok(&self.status)
    }

    /// A `mailto:` link carrying everything entered so far.
    ///
    /// Available in every state so the visitor is never fully blocked.
    #[must_use]
    pub fn mailto_link(&self, to: &str) -> String {
        let constraint = self.primary_constraint.trim();
        let subject = if constraint.is_empty() {
            "Project inquiry".to_string()
        } else {
            format!("Project inquiry: {constraint}")
        };

        let mut body = String::new();
        for field in Field::REQUIRED {
            body.push_str(field.label());
            body.push_str(": ");
            body.push_str(self.value(field).trim());
            body.push('\n');
        }
        let context = self.context.trim();
        if !context.is_empty() {
            body.push_str("\nContext:\n");
            body.push_str(context);
            body.push('\n');
        }

        format!(
            "mailto:{to}?subject={}&body={}",
            urlencoding::encode(&subject),
            urlencoding::encode(&body)
        )
    }

    fn payload(&self) -> ContactRequest {
        let non_empty = |s: &str| Some(s.to_owned()).filter(|s| !s.is_empty());

        #[allow(clippy::cast_precision_loss)] // Epoch millis stay well below 2^53
        let mounted_at = Some(self.mounted_at_ms as f64);

        ContactRequest {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            system_in_scope: Some(self.system_in_scope.clone()),
            primary_constraint: Some(self.primary_constraint.clone()),
            context: non_empty(&self.context),
            honey: non_empty(&self.honey),
            mounted_at,
        }
    }

    fn transition(&mut self, next: SubmissionStatus) -> Result<(), FormError> {
        if !self.status.can_transition_to(&next) {
            return Err(FormError::InvalidTransition {
                from: self.status.name(),
                to: next.name(),
            });
        }
        self.status = next;
        Ok(())
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::SystemInScope => &mut self.system_in_scope,
            Field::PrimaryConstraint => &mut self.primary_constraint,
            Field::Context => &mut self.context,
        }
    }
}

fn rejection_message(body: Option<&ContactResponse>) -> String {
    match body {
        Some(ContactResponse {
            error: Some(message),
            ..
        }) if !message.trim().is_empty() => message.clone(),
        Some(ContactResponse {
            field: Some(field), ..
        }) => format!(
            "Please check the {} field and try again.",
            field.label().to_lowercase()
        ),
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
}
