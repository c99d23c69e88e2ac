//! Integration tests for `POST /api/contact`.
//!
//! Each test drives the full router (middleware included) and asserts on
//! both the HTTP response and the emails handed to the transport.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use blacklake_core::{Field, SpamPolicy};
use blacklake_integration_tests::{
    OWNER_EMAIL, RecordingSender, SITE_URL, TestContext, environment, json_body, now_ms,
    valid_submission,
};
use blacklake_site::config::{EnvironmentConfig, RuntimeMode};
use serde_json::{Value, json};

fn with_field(mut body: Value, key: &str, value: Value) -> Value {
    if let Some(obj) = body.as_object_mut() {
        obj.insert(key.to_string(), value);
    }
    body
}

fn without_field(mut body: Value, key: &str) -> Value {
    if let Some(obj) = body.as_object_mut() {
        obj.remove(key);
    }
    body
}

// =============================================================================
// Accepted Submissions
// =============================================================================

#[tokio::test]
async fn test_valid_submission_sends_two_emails() {
    let ctx = TestContext::new();

    let (status, body) = ctx.post_contact(&valid_submission()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let sent = ctx.sender.sent();
    assert_eq!(sent.len(), 2, "owner notification and auto-reply");

    let owner = &sent[0];
    assert_eq!(owner.to, OWNER_EMAIL);
    assert!(owner.subject.contains("latency"), "subject: {}", owner.subject);
    assert_eq!(owner.reply_to.as_deref(), Some("jane@x.com"));
    assert!(owner.text.contains("billing pipeline"));

    let reply = &sent[1];
    assert_eq!(reply.to, "jane@x.com");
    assert_eq!(reply.reply_to.as_deref(), Some(OWNER_EMAIL));
    assert!(reply.text.starts_with("Hi Jane,"));
    assert!(reply.text.contains(SITE_URL));
}

#[tokio::test]
async fn test_owner_notification_carries_request_metadata() {
    let ctx = TestContext::new();

    let request = Request::post("/api/contact")
        .header(CONTENT_TYPE, "application/json")
        .header("x-request-id", "req-abc-123")
        .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
        .header("user-agent", "integration-test/1.0")
        .body(Body::from(valid_submission().to_string()))
        .expect("request");
    let response = ctx.request(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-abc-123")
    );

    let sent = ctx.sender.sent();
    let owner = sent.first().expect("owner notification");
    assert!(owner.text.contains("Request ID:     req-abc-123"));
    assert!(owner.text.contains("Client IP:      203.0.113.9"));
    assert!(owner.text.contains("User agent:     integration-test/1.0"));
    assert!(owner.text.contains(" ms)"), "elapsed time: {}", owner.text);
}

#[tokio::test]
async fn test_missing_mounted_at_skips_timing_check() {
    let ctx = TestContext::new();

    let (status, _) = ctx
        .post_contact(&without_field(valid_submission(), "mountedAt"))
        .await;

    assert_eq!(status, StatusCode::OK);
    let sent = ctx.sender.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].text.contains("Time to submit: unknown"));
}

#[tokio::test]
async fn test_optional_context_is_included() {
    let ctx = TestContext::new();
    let body = with_field(
        valid_submission(),
        "context",
        json!("  We see p99 spikes at month end.  "),
    );

    let (status, _) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::OK);
    let sent = ctx.sender.sent();
    assert!(sent[0].text.contains("We see p99 spikes at month end."));
    assert!(!sent[0].text.contains("  We see"));
}

#[tokio::test]
async fn test_duplicate_submissions_are_not_deduplicated() {
    let ctx = TestContext::new();
    let body = valid_submission();

    let (first, _) = ctx.post_contact(&body).await;
    let (second, _) = ctx.post_contact(&body).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(ctx.sender.sent().len(), 4);
}

#[tokio::test]
async fn test_development_mode_runs_without_configuration() {
    let ctx = TestContext::with(
        RuntimeMode::Development,
        EnvironmentConfig::default(),
        RecordingSender::new(),
    );

    let (status, body) = ctx.post_contact(&valid_submission()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
    assert_eq!(ctx.sender.sent().len(), 2);
}

// =============================================================================
// Anti-Spam Gate
// =============================================================================

#[tokio::test]
async fn test_honeypot_is_disguised_as_success() {
    let ctx = TestContext::new();
    let body = with_field(valid_submission(), "honey", json!("filled"));

    let (status, body) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
    assert!(ctx.sender.sent().is_empty());
    assert_eq!(ctx.sender.attempts(), 0);
}

#[tokio::test]
async fn test_honeypot_wins_over_invalid_fields_and_timing() {
    let ctx = TestContext::new();
    let body = json!({ "honey": "x", "mountedAt": now_ms() });

    let (status, body) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
    assert_eq!(ctx.sender.attempts(), 0);
}

#[tokio::test]
async fn test_submitted_too_fast_is_rejected() {
    let ctx = TestContext::new();
    let body = with_field(valid_submission(), "mountedAt", json!(now_ms()));

    let (status, body) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].is_string());
    assert_eq!(ctx.sender.attempts(), 0);
}

#[tokio::test]
async fn test_too_fast_wins_over_invalid_fields() {
    let ctx = TestContext::new();
    let body = json!({ "email": "not-an-email", "mountedAt": now_ms() - 100 });

    let (status, _) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_custom_policy_threshold() {
    let ctx = TestContext::with_policy(SpamPolicy::new(Duration::ZERO));
    let body = with_field(valid_submission(), "mountedAt", json!(now_ms() - 1));

    let (status, _) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctx.sender.sent().len(), 2);

    let strict = TestContext::with_policy(SpamPolicy::new(Duration::from_secs(10)));
    let (status, _) = strict.post_contact(&valid_submission()).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(strict.sender.attempts(), 0);
}

#[tokio::test]
async fn test_future_mounted_at_is_rejected() {
    let ctx = TestContext::new();
    let body = with_field(valid_submission(), "mountedAt", json!(now_ms() + 60_000));

    let (status, _) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_required_fields_are_checked_in_order() {
    let ctx = TestContext::new();
    let mounted = now_ms() - 2_000;

    let cases = [
        (json!({ "mountedAt": mounted }), Field::Name),
        (json!({ "name": "Jane", "mountedAt": mounted }), Field::Email),
        (
            json!({ "name": "Jane", "email": "jane@x.com", "mountedAt": mounted }),
            Field::SystemInScope,
        ),
        (
            json!({
                "name": "Jane",
                "email": "jane@x.com",
                "systemInScope": "billing",
                "mountedAt": mounted,
            }),
            Field::PrimaryConstraint,
        ),
    ];

    for (body, field) in cases {
        let (status, body) = ctx.post_contact(&body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "ok": false, "field": field.as_str() }));
    }
    assert_eq!(ctx.sender.attempts(), 0);
}

#[tokio::test]
async fn test_whitespace_only_fields_are_missing() {
    let ctx = TestContext::new();
    let body = with_field(valid_submission(), "systemInScope", json!("   \n\t "));

    let (status, body) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], json!("systemInScope"));
}

#[tokio::test]
async fn test_invalid_emails_are_rejected() {
    let ctx = TestContext::new();
    let too_long = format!("{}@example.com", "a".repeat(250));

    for email in [
        "no-at-sign.com",
        "jane@localhost",
        "@x.com",
        "jane@@x.com",
        "jane doe@x.com",
        too_long.as_str(),
    ] {
        let body = with_field(valid_submission(), "email", json!(email));
        let (status, body) = ctx.post_contact(&body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "email: {email}");
        assert_eq!(body["field"], json!("email"), "email: {email}");
    }
}

#[tokio::test]
async fn test_oversized_fields_are_clamped() {
    let ctx = TestContext::new();
    let mut body = valid_submission();
    body = with_field(body, "name", json!("a".repeat(500)));
    body = with_field(body, "context", json!("c".repeat(10_000)));

    let (status, _) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::OK);
    let sent = ctx.sender.sent();
    let owner = &sent[0];
    assert!(owner.text.contains(&"c".repeat(4_000)));
    assert!(!owner.text.contains(&"c".repeat(4_001)));
    assert!(owner.text.contains(&"a".repeat(120)));
    assert!(!owner.text.contains(&"a".repeat(121)));

    let reply = &sent[1];
    assert!(reply.text.starts_with(&format!("Hi {},", "a".repeat(120))));
}

#[tokio::test]
async fn test_subject_is_single_line() {
    let ctx = TestContext::new();
    let body = with_field(
        valid_submission(),
        "primaryConstraint",
        json!("latency\r\nBcc: attacker@example.com"),
    );

    let (status, _) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::OK);
    let subject = &ctx.sender.sent()[0].subject;
    assert!(!subject.contains('\n'));
    assert!(!subject.contains('\r'));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_missing_configuration_in_production() {
    let ctx = TestContext::with(
        RuntimeMode::Production,
        environment(&[("CONTACT_FROM_EMAIL", "site@blacklake.test")]),
        RecordingSender::new(),
    );

    let (status, body) = ctx.post_contact(&valid_submission()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].is_string());
    // Variable names stay in the logs
    assert!(!body.to_string().contains("RESEND_API_KEY"));
    assert_eq!(ctx.sender.attempts(), 0);
}

#[tokio::test]
async fn test_environment_guard_runs_before_honeypot() {
    let ctx = TestContext::with(
        RuntimeMode::Production,
        EnvironmentConfig::default(),
        RecordingSender::new(),
    );
    let body = with_field(valid_submission(), "honey", json!("filled"));

    let (status, _) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_owner_notification_failure() {
    let sender = RecordingSender::failing_after(0);
    let ctx = TestContext::with(
        RuntimeMode::Production,
        blacklake_integration_tests::complete_environment(),
        sender,
    );

    let (status, body) = ctx.post_contact(&valid_submission()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "ok": false, "error": "Internal error" }));
    // Auto-reply is not attempted after the owner leg fails
    assert_eq!(ctx.sender.attempts(), 1);
}

#[tokio::test]
async fn test_auto_reply_failure() {
    let sender = RecordingSender::failing_after(1);
    let ctx = TestContext::with(
        RuntimeMode::Production,
        blacklake_integration_tests::complete_environment(),
        sender,
    );

    let (status, body) = ctx.post_contact(&valid_submission()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "ok": false, "error": "Internal error" }));
    assert_eq!(ctx.sender.attempts(), 2);
    assert_eq!(ctx.sender.sent().len(), 1, "owner email already went out");
}

#[tokio::test]
async fn test_malformed_json_is_internal_error() {
    let ctx = TestContext::new();

    let request = Request::post("/api/contact")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .expect("request");
    let response = ctx.request(request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "ok": false, "error": "Internal error" })
    );
}

#[tokio::test]
async fn test_wrong_field_types_are_internal_error() {
    let ctx = TestContext::new();
    let body = with_field(valid_submission(), "name", json!(42));

    let (status, body) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
}

#[tokio::test]
async fn test_oversized_body_is_refused() {
    let ctx = TestContext::new();
    let body = with_field(valid_submission(), "context", json!("x".repeat(100_000)));

    let (status, body) = ctx.post_contact(&body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(ctx.sender.attempts(), 0);
}

// =============================================================================
// Method Handling
// =============================================================================

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let ctx = TestContext::new();

    let response = ctx
        .request(
            Request::get("/api/contact")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response
            .headers()
            .get("allow")
            .and_then(|v| v.to_str().ok()),
        Some("POST")
    );
    assert_eq!(json_body(response).await, json!({ "ok": false }));
}

#[tokio::test]
async fn test_other_methods_are_not_allowed() {
    let ctx = TestContext::new();

    for method in ["PUT", "DELETE", "PATCH"] {
        let response = ctx
            .request(
                Request::builder()
                    .method(method)
                    .uri("/api/contact")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
    }
}
