//! Transactional email transport.
//!
//! [`EmailSender`] is object-safe so the notifier can hold an
//! `Arc<dyn EmailSender>`: [`ResendEmailSender`] talks to the Resend HTTP API
//! in production, [`LogEmailSender`] writes messages to the log when no API
//! key is configured.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

use crate::config::EnvironmentConfig;

/// Resend API endpoint for sending a single email.
const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Upper bound on one API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A plain-text email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
}

/// Abstraction over an email transport.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one message.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the provider did not accept the message.
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Pick the transport for this process.
///
/// An API key selects Resend; without one, messages are only logged. In
/// production the environment guard refuses requests before a missing key
/// could matter.
///
/// # Errors
///
/// Returns `EmailError::Config` if the HTTP client cannot be built.
pub fn sender_from_config(
    environment: &EnvironmentConfig,
) -> Result<Arc<dyn EmailSender>, EmailError> {
    match &environment.resend_api_key {
        Some(api_key) => Ok(Arc::new(ResendEmailSender::new(api_key)?)),
        None => {
            tracing::warn!("RESEND_API_KEY not set; outbound email will only be logged");
            Ok(Arc::new(LogEmailSender))
        }
    }
}

// =============================================================================
// ResendEmailSender
// =============================================================================

/// Resend HTTP API transport.
#[derive(Clone)]
pub struct ResendEmailSender {
    client: reqwest::Client,
    endpoint: String,
}

/// Request body for `POST /emails`.
#[derive(Debug, Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

impl<'a> From<&'a EmailMessage> for ResendPayload<'a> {
    fn from(message: &'a EmailMessage) -> Self {
        Self {
            from: &message.from,
            to: [&message.to],
            subject: &message.subject,
            text: &message.text,
            reply_to: message.reply_to.as_deref(),
        }
    }
}

impl ResendEmailSender {
    /// Create a new Resend client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(api_key: &SecretString) -> Result<Self, EmailError> {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| EmailError::Config(format!("Invalid API key format: {e}")))?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: RESEND_ENDPOINT.to_string(),
        })
    }

    /// Point the client at a different endpoint (self-hosted relay, test server).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ResendPayload::from(message))
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!(to = %message.to, subject = %message.subject, "Email sent via Resend");
        Ok(())
    }
}

// =============================================================================
// LogEmailSender
// =============================================================================

/// Writes messages to the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        tracing::info!(
            from = %message.from,
            to = %message.to,
            reply_to = message.reply_to.as_deref().unwrap_or(""),
            subject = %message.subject,
            body = %message.text,
            "Email (not sent, no API key configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use axum::{
        Json, Router,
        extract::State,
        http::{HeaderMap as AxumHeaderMap, StatusCode},
        routing::post,
    };
    use serde_json::Value;

    use super::*;

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    /// Start a fake Resend API: `/ok` accepts, `/bad` answers 422.
    async fn fake_resend() -> (String, Seen) {
        fn record(seen: &Seen, headers: &AxumHeaderMap, body: Value) {
            let auth = headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            seen.lock().unwrap().push((auth, body));
        }

        async fn ok(
            State(seen): State<Seen>,
            headers: AxumHeaderMap,
            Json(body): Json<Value>,
        ) -> Json<Value> {
            record(&seen, &headers, body);
            Json(serde_json::json!({ "id": "email_123" }))
        }

        async fn bad(
            State(seen): State<Seen>,
            headers: AxumHeaderMap,
            Json(body): Json<Value>,
        ) -> (StatusCode, &'static str) {
            record(&seen, &headers, body);
            (StatusCode::UNPROCESSABLE_ENTITY, "invalid from")
        }

        let seen = Seen::default();
        let app = Router::new()
            .route("/ok", post(ok))
            .route("/bad", post(bad))
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), seen)
    }

    #[tokio::test]
    async fn test_resend_sender_against_local_server() {
        let (base, seen) = fake_resend().await;
        let key = SecretString::from("re_abc");
        let message = EmailMessage {
            from: "a@b.co".to_string(),
            to: "c@d.co".to_string(),
            reply_to: None,
            subject: "s".to_string(),
            text: "t".to_string(),
        };

        let ok = ResendEmailSender::new(&key)
            .unwrap()
            .with_endpoint(format!("{base}/ok"));
        assert!(ok.send(&message).await.is_ok());

        let bad = ResendEmailSender::new(&key)
            .unwrap()
            .with_endpoint(format!("{base}/bad"));
        match bad.send(&message).await {
            Err(EmailError::Api { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "invalid from");
            }
            other => panic!("expected Api error, got {other:?}"),
        }

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        let expected = serde_json::json!({
            "from": "a@b.co",
            "to": ["c@d.co"],
            "subject": "s",
            "text": "t",
        });
        for (auth, body) in seen {
            assert_eq!(auth, "Bearer re_abc");
            assert_eq!(body, expected);
        }
    }

    fn message() -> EmailMessage {
        EmailMessage {
            from: "BlackLake <hello@blacklake.dev>".to_string(),
            to: "jane@x.com".to_string(),
            reply_to: Some("owner@blacklake.dev".to_string()),
            subject: "Thanks".to_string(),
            text: "Hello".to_string(),
        }
    }

    #[test]
    fn test_resend_payload_shape() {
        let message = message();
        let payload = serde_json::to_value(ResendPayload::from(&message)).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({
                "from": "BlackLake <hello@blacklake.dev>",
                "to": ["jane@x.com"],
                "subject": "Thanks",
                "text": "Hello",
                "reply_to": "owner@blacklake.dev",
            })
        );
    }

    #[test]
    fn test_resend_payload_omits_missing_reply_to() {
        let message = EmailMessage {
            reply_to: None,
            ..message()
        };
        let payload = serde_json::to_value(ResendPayload::from(&message)).unwrap();
        assert!(payload.get("reply_to").is_none());
    }

    #[test]
    fn test_resend_rejects_invalid_key() {
        let result = ResendEmailSender::new(&SecretString::from("bad\nkey"));
        assert!(matches!(result, Err(EmailError::Config(_))));
    }

    #[tokio::test]
    async fn test_log_sender_accepts_everything() {
        assert!(LogEmailSender.send(&message()).await.is_ok());
    }

    #[test]
    fn test_sender_from_config_without_key() {
        assert!(sender_from_config(&EnvironmentConfig::default()).is_ok());
    }
}
