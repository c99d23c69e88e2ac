//! Notification dispatcher for accepted contact submissions.
//!
//! Sends exactly two emails, in order: the owner notification and the
//! auto-reply to the submitter. A failure on either leg fails the whole
//! dispatch; there is no retry and no compensation if the first leg already
//! went out.

use std::net::IpAddr;
use std::sync::Arc;

use askama::Template;
use blacklake_core::ContactSubmission;
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use super::email::{EmailError, EmailMessage, EmailSender};
use crate::config::EnvironmentConfig;

/// Sender used when `CONTACT_FROM_EMAIL` is unset (development only).
const DEV_FROM_EMAIL: &str = "BlackLake <noreply@blacklake.localhost>";
/// Recipient used when `CONTACT_TO_EMAIL` is unset (development only).
const DEV_TO_EMAIL: &str = "owner@blacklake.localhost";
/// Site URL used when `SITE_URL` is unset (development only).
const DEV_SITE_URL: &str = "http://localhost:3000";

/// Plain text template for the owner notification.
#[derive(Template)]
#[template(path = "email/owner_notification.txt")]
struct OwnerNotificationText<'a> {
    name: &'a str,
    email: &'a str,
    system_in_scope: &'a str,
    primary_constraint: &'a str,
    context: &'a str,
    request_id: &'a str,
    received_at: &'a str,
    client_ip: &'a str,
    time_to_submit: &'a str,
    user_agent: &'a str,
}

/// Plain text template for the submitter auto-reply.
#[derive(Template)]
#[template(path = "email/auto_reply.txt")]
struct AutoReplyText<'a> {
    name: &'a str,
    system_in_scope: &'a str,
    primary_constraint: &'a str,
    site_url: &'a str,
}

/// Errors that can occur while dispatching notifications.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The owner notification was not accepted by the provider.
    #[error("owner notification failed: {0}")]
    OwnerNotification(#[source] EmailError),

    /// The auto-reply was not accepted by the provider.
    #[error("auto-reply failed: {0}")]
    AutoReply(#[source] EmailError),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Per-request metadata included in the owner notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub request_id: String,
    pub received_at: DateTime<Utc>,
    pub client_ip: Option<IpAddr>,
    pub time_to_submit_ms: Option<i64>,
    pub user_agent: Option<String>,
}

/// Sends the owner notification and the auto-reply.
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn EmailSender>,
    from: String,
    owner: String,
    site_url: String,
}

impl Notifier {
    /// Create a notifier with explicit addresses.
    pub fn new(
        sender: Arc<dyn EmailSender>,
        from: impl Into<String>,
        owner: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            from: from.into(),
            owner: owner.into(),
            site_url: site_url.into(),
        }
    }

    /// Create a notifier from the environment configuration.
    ///
    /// Unset values fall back to local development addresses; in production
    /// the environment guard rejects requests before these are ever used.
    #[must_use]
    pub fn from_config(environment: &EnvironmentConfig, sender: Arc<dyn EmailSender>) -> Self {
        Self::new(
            sender,
            environment.from_email.as_deref().unwrap_or(DEV_FROM_EMAIL),
            environment.to_email.as_deref().unwrap_or(DEV_TO_EMAIL),
            environment.site_url.as_deref().unwrap_or(DEV_SITE_URL),
        )
    }

    /// Build the owner notification for a submission.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Template` if rendering fails.
    pub fn owner_notification(
        &self,
        submission: &ContactSubmission,
        meta: &RequestMeta,
    ) -> Result<EmailMessage, NotifyError> {
        let received_at = meta
            .received_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let client_ip = meta
            .client_ip
            .map_or_else(|| "unknown".to_string(), |ip| ip.to_string());
        let time_to_submit = meta
            .time_to_submit_ms
            .map_or_else(|| "unknown".to_string(), format_elapsed);

        let text = OwnerNotificationText {
            name: &submission.name,
            email: submission.email.as_str(),
            system_in_scope: &submission.system_in_scope,
            primary_constraint: &submission.primary_constraint,
            context: submission.context.as_deref().unwrap_or("(none provided)"),
            request_id: &meta.request_id,
            received_at: &received_at,
            client_ip: &client_ip,
            time_to_submit: &time_to_submit,
            user_agent: meta.user_agent.as_deref().unwrap_or("unknown"),
        }
        .render()?;

        Ok(EmailMessage {
            from: self.from.clone(),
            to: self.owner.clone(),
            reply_to: Some(submission.email.to_string()),
            subject: format!(
                "New inquiry: {}",
                single_line(&submission.primary_constraint)
            ),
            text,
        })
    }

    /// Build the auto-reply for a submission.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Template` if rendering fails.
    pub fn auto_reply(&self, submission: &ContactSubmission) -> Result<EmailMessage, NotifyError> {
        let text = AutoReplyText {
            name: &submission.name,
            system_in_scope: &submission.system_in_scope,
            primary_constraint: &submission.primary_constraint,
            site_url: &self.site_url,
        }
        .render()?;

        Ok(EmailMessage {
            from: self.from.clone(),
            to: submission.email.to_string(),
            reply_to: Some(self.owner.clone()),
            subject: "Thanks for reaching out to BlackLake".to_string(),
            text,
        })
    }

    /// Send the owner notification, then the auto-reply.
    ///
    /// # Errors
    ///
    /// Returns the first failure; the auto-reply is not attempted if the
    /// owner notification fails.
    pub async fn dispatch(
        &self,
        submission: &ContactSubmission,
        meta: &RequestMeta,
    ) -> Result<(), NotifyError> {
        let owner = self.owner_notification(submission, meta)?;
        let reply = self.auto_reply(submission)?;

        self.sender
            .send(&owner)
            .await
            .map_err(NotifyError::OwnerNotification)?;
        self.sender
            .send(&reply)
            .await
            .map_err(NotifyError::AutoReply)?;

        tracing::info!(request_id = %meta.request_id, "Contact notifications sent");
        Ok(())
    }
}

/// Collapse all whitespace runs (including newlines) into single spaces.
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[allow(clippy::cast_precision_loss)] // Display only
fn format_elapsed(ms: i64) -> String {
    format!("{:.1}s ({ms} ms)", ms as f64 / 1000.0)
}
