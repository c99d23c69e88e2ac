//! Integration tests for the BlackLake site.
//!
//! Tests drive the full router in-process with `tower::ServiceExt::oneshot`;
//! no server, network or email provider is needed. Outbound email goes to a
//! [`RecordingSender`] so tests can assert on exactly what would be sent.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p blacklake-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `contact_api` - `POST /api/contact` outcomes and the emails they send
//! - `site_routes` - health checks, middleware headers, static fallback

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header::CONTENT_TYPE},
};
use blacklake_core::SpamPolicy;
use blacklake_site::config::{EnvironmentConfig, RuntimeMode, SiteConfig};
use blacklake_site::routes;
use blacklake_site::services::{EmailError, EmailMessage, EmailSender};
use blacklake_site::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Owner address used by [`complete_environment`].
pub const OWNER_EMAIL: &str = "owner@blacklake.test";
/// Sender address used by [`complete_environment`].
pub const FROM_EMAIL: &str = "BlackLake <site@blacklake.test>";
/// Site URL used by [`complete_environment`].
pub const SITE_URL: &str = "https://blacklake.test";

/// Email transport that records every message instead of sending it.
///
/// Fails every send once `fail_from` messages have been accepted, if set.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<EmailMessage>>,
    attempts: AtomicUsize,
    fail_from: Option<usize>,
}

impl RecordingSender {
    /// A sender that accepts everything.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A sender that accepts `accepted` messages, then fails.
    #[must_use]
    pub fn failing_after(accepted: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_from: Some(accepted),
            ..Self::default()
        })
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of send calls, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail_from.is_some_and(|n| attempt > n) {
            return Err(EmailError::Api {
                status: 503,
                message: "provider unavailable".to_string(),
            });
        }

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        Ok(())
    }
}

/// Environment configuration with every required variable present.
#[must_use]
pub fn complete_environment() -> EnvironmentConfig {
    environment(&[
        ("RESEND_API_KEY", "re_test_key"),
        ("CONTACT_FROM_EMAIL", FROM_EMAIL),
        ("CONTACT_TO_EMAIL", OWNER_EMAIL),
        ("SITE_URL", SITE_URL),
    ])
}

/// Environment configuration from explicit key/value pairs.
#[must_use]
pub fn environment(vars: &[(&str, &str)]) -> EnvironmentConfig {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    EnvironmentConfig::from_lookup(move |key: &str| map.get(key).cloned())
}

/// A router wired to a recording email transport.
pub struct TestContext {
    pub app: Router,
    pub sender: Arc<RecordingSender>,
}

impl TestContext {
    /// Production mode with a complete environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with(
            RuntimeMode::Production,
            complete_environment(),
            RecordingSender::new(),
        )
    }

    /// Custom mode, environment and transport.
    #[must_use]
    pub fn with(
        mode: RuntimeMode,
        environment: EnvironmentConfig,
        sender: Arc<RecordingSender>,
    ) -> Self {
        Self::with_config(SiteConfig::new(mode, environment), sender)
    }

    /// Fully custom site configuration.
    #[must_use]
    pub fn with_config(config: SiteConfig, sender: Arc<RecordingSender>) -> Self {
        let state = AppState::new(config, sender.clone());
        Self {
            app: routes::app(state),
            sender,
        }
    }

    /// Production mode with a complete environment and a custom anti-spam policy.
    #[must_use]
    pub fn with_policy(policy: SpamPolicy) -> Self {
        let sender = RecordingSender::new();
        let config = SiteConfig::new(RuntimeMode::Production, complete_environment());
        let state = AppState::with_policy(config, sender.clone(), policy);
        Self {
            app: routes::app(state),
            sender,
        }
    }

    /// Send one request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router itself fails, which it never should.
    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {})
    }

    /// POST a JSON body to `/api/contact` and return the raw response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn post_raw(&self, body: &Value) -> Response<Body> {
        let request = Request::post("/api/contact")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_else(|e| panic!("invalid request: {e}"));
        self.request(request).await
    }

    /// POST a JSON body to `/api/contact` and return status and parsed body.
    pub async fn post_contact(&self, body: &Value) -> (StatusCode, Value) {
        let response = self.post_raw(body).await;
        let status = response.status();
        (status, json_body(response).await)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Current time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A submission that passes every check, mounted two seconds ago.
#[must_use]
pub fn valid_submission() -> Value {
    json!({
        "name": "Jane",
        "email": "jane@x.com",
        "systemInScope": "billing pipeline",
        "primaryConstraint": "latency",
        "mountedAt": now_ms() - 2_000,
    })
}

/// Read a response body as JSON (`Value::Null` if it is not JSON).
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
