use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use auditflow_core::models::{StartSessionRequest, SubmitMessageRequest};

use crate::WebState;
use crate::dto::{
    EmailResultsRequest, EmailResultsResponse, parse_json_body, parse_optional_json_body,
};
use crate::error::audit_error_response;

const UNKNOWN_CLIENT: &str = "unknown";

pub async fn healthz() -> &'static str {
    "ok"
}

/// `POST /api/audit/session`: resume the session named in the body when it is
/// still active, otherwise open a new one. An empty body is accepted.
pub async fn start_session(State(state): State<WebState>, body: Bytes) -> Response {
    let request = match parse_optional_json_body::<StartSessionRequest>(&body) {
        Ok(request) => request,
        Err(err) => {
            return audit_error_response(err, "audit.session", None, "Failed to start audit");
        }
    };
    match state.service.start_session(request) {
        Ok(turn) => (StatusCode::OK, Json(turn)).into_response(),
        Err(err) => audit_error_response(err, "audit.session", None, "Failed to start audit"),
    }
}

/// `POST /api/audit/message`: record one answer and return the next turn.
///
/// Failures map to 400 for bad input or an ended session, 404 for an unknown
/// or expired session, 409 when another request updated the session first
/// (retry with the same answer), 429 when a rate limit is hit, and a masked
/// 500 "Failed to process message" for advisor or storage failures. Only a
/// 200 changes the stored session.
pub async fn submit_message(
    State(state): State<WebState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match parse_json_body::<SubmitMessageRequest>(&body) {
        Ok(request) => request,
        Err(err) => {
            return audit_error_response(err, "audit.message", None, "Failed to process message");
        }
    };
    let session_id = request.session_id.clone();
    let client_ip = client_ip(&headers);
    match state.service.submit_message(request, &client_ip).await {
        Ok(turn) => (StatusCode::OK, Json(turn)).into_response(),
        Err(err) => audit_error_response(
            err,
            "audit.message",
            Some(session_id),
            "Failed to process message",
        ),
    }
}

/// `POST /api/audit/email-results`: forward a completed audit to the email
/// webhook. 400 until the audit is complete and an email is on file.
pub async fn email_results(State(state): State<WebState>, body: Bytes) -> Response {
    let request = match parse_json_body::<EmailResultsRequest>(&body) {
        Ok(request) => request,
        Err(err) => {
            return audit_error_response(err, "audit.email_results", None, "Failed to send results");
        }
    };
    match state.service.email_results(&request.session_id).await {
        Ok(()) => (StatusCode::OK, Json(EmailResultsResponse { success: true })).into_response(),
        Err(err) => audit_error_response(
            err,
            "audit.email_results",
            Some(request.session_id),
            "Failed to send results",
        ),
    }
}

/// `GET /api/audit/session/{id}`: redacted view of a live session.
pub async fn get_session(State(state): State<WebState>, Path(id): Path<String>) -> Response {
    match state.service.get_session_view(&id) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => {
            audit_error_response(err, "audit.session.get", Some(id), "Failed to load session")
        }
    }
}

/// First hop of `x-forwarded-for`, then `x-real-ip`.
pub(crate) fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };
    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
