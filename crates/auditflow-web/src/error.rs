use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use auditflow_core::AuditError;

#[expect(
    clippy::needless_pass_by_value,
    reason = "handlers naturally own error values from `Result` and pass them through"
)]
pub fn audit_error_response(
    err: AuditError,
    operation: &str,
    session_id: Option<String>,
    fallback_message: &str,
) -> Response {
    let status = status_for_audit_error(&err);
    let payload = err.to_payload(operation, session_id, fallback_message);
    if !err.is_client_error() {
        tracing::error!(
            operation,
            code = payload.code.as_str(),
            trace_id = payload.trace_id.as_str(),
            error = %err,
            "request failed"
        );
    } else {
        tracing::debug!(
            operation,
            code = payload.code.as_str(),
            message = payload.message.as_str(),
            "request rejected"
        );
    }
    (status, Json(payload)).into_response()
}

fn status_for_audit_error(err: &AuditError) -> StatusCode {
    match err {
        AuditError::Validation(_) | AuditError::SessionEnded(_) => StatusCode::BAD_REQUEST,
        AuditError::NotFound(_) => StatusCode::NOT_FOUND,
        AuditError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        AuditError::Conflict(_) => StatusCode::CONFLICT,
        AuditError::Configuration(_)
        | AuditError::Upstream(_)
        | AuditError::Io(_)
        | AuditError::Json(_)
        | AuditError::Sqlite(_)
        | AuditError::Http(_)
        | AuditError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(
            status_for_audit_error(&AuditError::SessionEnded("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for_audit_error(&AuditError::RateLimited("x".to_string())),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_for_audit_error(&AuditError::Conflict("x".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for_audit_error(&AuditError::Configuration("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn client_error_flag_agrees_with_status_class() {
        let errors = [
            AuditError::Validation("x".to_string()),
            AuditError::NotFound("x".to_string()),
            AuditError::SessionEnded("x".to_string()),
            AuditError::RateLimited("x".to_string()),
            AuditError::Conflict("x".to_string()),
            AuditError::Configuration("x".to_string()),
            AuditError::Upstream("x".to_string()),
            AuditError::Internal("x".to_string()),
        ];
        for err in errors {
            let status = status_for_audit_error(&err);
            assert_eq!(err.is_client_error(), status.is_client_error(), "{err:?}");
        }
    }
}
