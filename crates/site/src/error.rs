//! Unified error handling with Sentry integration.
//!
//! `AppError` is the single boundary for the contact API: every failure is
//! rendered as a JSON [`ContactResponse`] with `ok: false`. Server-side
//! failures are logged and captured to Sentry; their details never reach
//! the client.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::ALLOW},
    response::{IntoResponse, Response},
};
use blacklake_core::{ContactResponse, Field};
use thiserror::Error;

use crate::config::ConfigError;
use crate::services::NotifyError;

/// Message returned for any unexpected server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error";

/// Message returned when the environment guard fails.
pub const CONFIG_ERROR_MESSAGE: &str = "Server configuration error";

/// Message returned when a form was submitted too soon after loading.
pub const TOO_FAST_MESSAGE: &str =
    "Please take a moment to review your message before sending.";

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Required configuration is missing.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Sending one of the notification emails failed.
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// A required field failed validation.
    #[error("Invalid field: {0}")]
    InvalidField(Field),

    /// Submitted faster than the anti-spam threshold.
    #[error("Submitted too quickly ({elapsed_ms} ms after mount)")]
    TooFast { elapsed_ms: i64 },

    /// The request body could not be read as a contact request.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// HTTP method not supported on this route.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Config(_) | Self::Notify(_) | Self::MalformedBody(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::InvalidField(_) => StatusCode::BAD_REQUEST,
            Self::TooFast { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// Client-facing body. Internal details are never included.
    #[must_use]
    pub fn body(&self) -> ContactResponse {
        match self {
            Self::Config(_) => ContactResponse::error(CONFIG_ERROR_MESSAGE),
            Self::Notify(_) | Self::MalformedBody(_) | Self::Internal(_) => {
                ContactResponse::error(INTERNAL_ERROR_MESSAGE)
            }
            Self::InvalidField(field) => ContactResponse::invalid_field(*field),
            Self::TooFast { .. } => ContactResponse::error(TOO_FAST_MESSAGE),
            Self::MethodNotAllowed => ContactResponse::failed(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::info!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let mut response = (status, Json(self.body())).into_response();
        if matches!(self, Self::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::InvalidField(Field::SystemInScope);
        assert_eq!(err.to_string(), "Invalid field: systemInScope");

        let err = AppError::TooFast { elapsed_ms: 12 };
        assert_eq!(err.to_string(), "Submitted too quickly (12 ms after mount)");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::InvalidField(Field::Name)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::TooFast { elapsed_ms: 0 }),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Config(ConfigError::MissingEnvVars(vec![
                "RESEND_API_KEY".to_string()
            ]))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::MalformedBody("eof".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::MethodNotAllowed),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_bodies_hide_internal_details() {
        let err = AppError::Config(ConfigError::MissingEnvVars(vec![
            "RESEND_API_KEY".to_string(),
        ]));
        assert_eq!(err.body(), ContactResponse::error(CONFIG_ERROR_MESSAGE));

        let err = AppError::Internal("stack trace here".to_string());
        assert_eq!(err.body(), ContactResponse::error(INTERNAL_ERROR_MESSAGE));

        assert_eq!(AppError::MethodNotAllowed.body(), ContactResponse::failed());
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let response = AppError::MethodNotAllowed.into_response();
        assert_eq!(response.headers().get(ALLOW).unwrap(), "POST");
    }
}
