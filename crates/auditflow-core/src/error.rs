use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("session ended: {0}")]
    SessionEnded(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub operation: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AuditError {
    pub(crate) fn mutex_poisoned(name: &str) -> Self {
        Self::Internal(format!("{name} mutex poisoned"))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::SessionEnded(_) => "SESSION_ENDED",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::Conflict(_) => "CONFLICT",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Sqlite(_) => "SQLITE_ERROR",
            Self::Http(_) => "HTTP_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-caused failures whose message is safe to echo back verbatim.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NotFound(_)
                | Self::SessionEnded(_)
                | Self::RateLimited(_)
                | Self::Conflict(_)
        )
    }

    /// Message returned to HTTP callers. Server-side failures collapse to
    /// `fallback` so internal detail never leaves the process.
    #[must_use]
    pub fn public_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::SessionEnded(message)
            | Self::RateLimited(message)
            | Self::Conflict(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn to_payload(
        &self,
        operation: impl Into<String>,
        session_id: Option<String>,
        fallback_message: &str,
    ) -> ErrorPayload {
        ErrorPayload {
            code: self.code().to_string(),
            message: self.public_message(fallback_message),
            operation: operation.into(),
            trace_id: Uuid::new_v4().to_string(),
            session_id,
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let err = AuditError::Validation("Audit not complete".to_string());
        let payload = err.to_payload("audit.email_results", None, "Failed to send results");
        assert_eq!(payload.code, "VALIDATION_FAILED");
        assert_eq!(payload.message, "Audit not complete");
    }

    #[test]
    fn server_errors_are_masked() {
        let err = AuditError::Internal("disk on fire at /var/lib/db".to_string());
        let payload = err.to_payload(
            "audit.message",
            Some("abc".to_string()),
            "Failed to process message",
        );
        assert_eq!(payload.code, "INTERNAL_ERROR");
        assert_eq!(payload.message, "Failed to process message");
        assert_eq!(payload.session_id.as_deref(), Some("abc"));
        assert!(!err.is_client_error());
    }
}
