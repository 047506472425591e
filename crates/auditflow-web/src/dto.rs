use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use auditflow_core::AuditError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResultsRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct EmailResultsResponse {
    pub success: bool,
}

pub fn parse_json_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AuditError> {
    serde_json::from_slice(bytes)
        .map_err(|_| AuditError::Validation("Invalid request body".to_string()))
}

/// Like [`parse_json_body`], but a blank body yields `T::default()`.
pub fn parse_optional_json_body<T: DeserializeOwned + Default>(
    bytes: &[u8],
) -> Result<T, AuditError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    parse_json_body(bytes)
}
