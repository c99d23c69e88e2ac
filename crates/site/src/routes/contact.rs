//! Contact form route handlers.
//!
//! Runs the intake pipeline for `POST /api/contact`: environment guard,
//! anti-spam gate, validation, then the two notification emails.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header::USER_AGENT},
    response::{IntoResponse, Response},
};
use blacklake_core::{ContactRequest, ContactResponse, IntakeOutcome, Rejection, screen};
use chrono::Utc;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::{ClientIp, RequestId};
use crate::services::RequestMeta;
use crate::state::AppState;

/// Upper bound on a contact request body.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Longest user agent copied into the owner notification.
const MAX_USER_AGENT_LEN: usize = 512;

/// Submit the contact form.
///
/// POST /api/contact
///
/// A honeypot hit is answered exactly like an accepted submission; only the
/// logs tell them apart.
#[instrument(skip_all, fields(request_id = %request_id))]
pub async fn submit(
    State(state): State<AppState>,
    request_id: RequestId,
    ClientIp(client_ip): ClientIp,
    headers: HeaderMap,
    payload: std::result::Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>> {
    let config = state.config();
    if let Err(e) = config.environment.guard(config.mode) {
        tracing::error!(error = %e, "Environment guard failed");
        return Err(e.into());
    }

    let Json(request) = payload.map_err(|e| AppError::MalformedBody(e.body_text()))?;

    let received_at = Utc::now();
    match screen(&request, state.spam_policy(), received_at.timestamp_millis()) {
        IntakeOutcome::SilentlyDiscarded => {
            tracing::info!(client_ip = ?client_ip, "Honeypot filled; submission discarded");
            Ok(Json(ContactResponse::accepted()))
        }
        IntakeOutcome::Rejected(Rejection::TooFast { elapsed_ms }) => {
            Err(AppError::TooFast { elapsed_ms })
        }
        IntakeOutcome::Rejected(Rejection::InvalidField(field)) => {
            Err(AppError::InvalidField(field))
        }
        IntakeOutcome::Accepted {
            submission,
            elapsed_ms,
        } => {
            let meta = RequestMeta {
                request_id: request_id.0,
                received_at,
                client_ip,
                time_to_submit_ms: elapsed_ms,
                user_agent: user_agent(&headers),
            };

            state.notifier().dispatch(&submission, &meta).await?;

            tracing::info!(
                time_to_submit_ms = ?elapsed_ms,
                "Contact submission delivered"
            );
            Ok(Json(ContactResponse::accepted()))
        }
    }
}

/// Any method other than POST on the contact route.
pub async fn method_not_allowed() -> Response {
    AppError::MethodNotAllowed.into_response()
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| blacklake_core::clamp(ua, MAX_USER_AGENT_LEN))
        .filter(|ua| !ua.is_empty())
}
