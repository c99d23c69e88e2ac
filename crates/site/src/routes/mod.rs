//! HTTP route handlers for the marketing site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (environment guard)
//!
//! # Contact
//! POST /api/contact            - Submit the contact form
//! *    /api/contact            - 405 for any other method
//!
//! # Static
//! GET  /*                      - Built site assets (when SITE_STATIC_DIR is set)
//! ```

pub mod contact;
pub mod health;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new().route(
        "/contact",
        post(contact::submit)
            .fallback(contact::method_not_allowed)
            .layer(DefaultBodyLimit::max(contact::BODY_LIMIT_BYTES)),
    )
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api", api_routes())
}

/// Build the complete application with middleware and state applied.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without an initialized client.
pub fn app(state: AppState) -> Router {
    let mut router = routes();

    if let Some(dir) = &state.config().static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
