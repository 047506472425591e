use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{API_KEY_HEADER, WebhookConfig};
use crate::error::{AuditError, Result};

/// Shared HTTP client for the automation webhooks. Carries the API key header
/// and timeout; never retries.
#[derive(Clone)]
pub struct WebhookClient {
    http: Client,
}

impl std::fmt::Debug for WebhookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookClient").finish_non_exhaustive()
    }
}

impl WebhookClient {
    pub fn new(config: &WebhookConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|e| {
                AuditError::Configuration(format!("invalid AUDITFLOW_WEBHOOK_API_KEY: {e}"))
            })?;
            headers.insert(API_KEY_HEADER, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { http })
    }

    /// POST `body` as JSON and return the response text. Non-2xx statuses are
    /// upstream failures.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &Url,
        label: &str,
        body: &B,
    ) -> Result<String> {
        let response = self.http.post(url.clone()).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::Upstream(format!(
                "{label} webhook returned status {status}"
            )));
        }
        Ok(response.text().await?)
    }
}

/// Decode a webhook reply. Automation tools often wrap a single item in an
/// array, so a one-element array is unwrapped first.
pub fn decode_reply<T: DeserializeOwned>(body: &str, label: &str) -> Result<T> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| AuditError::Upstream(format!("{label} reply is not JSON: {err}")))?;
    let value = match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        other => other,
    };
    serde_json::from_value(value)
        .map_err(|err| AuditError::Upstream(format!("{label} reply has unexpected shape: {err}")))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        question: String,
    }

    #[test]
    fn decodes_plain_and_wrapped_replies() {
        let plain: Reply = decode_reply(r#"{"question":"a"}"#, "advisor").expect("plain");
        assert_eq!(plain.question, "a");
        let wrapped: Reply = decode_reply(r#"[{"question":"b"}]"#, "advisor").expect("wrapped");
        assert_eq!(wrapped.question, "b");
    }

    #[test]
    fn malformed_reply_is_upstream_error() {
        let err = decode_reply::<Reply>("<html>", "advisor").expect_err("not json");
        assert!(matches!(err, AuditError::Upstream(_)));
        let err = decode_reply::<Reply>(r#"{"other":1}"#, "advisor").expect_err("shape");
        assert!(matches!(err, AuditError::Upstream(_)));
    }

    #[test]
    fn rejects_api_key_with_invalid_header_bytes() {
        let config = WebhookConfig {
            api_key: Some("bad\nkey".to_string()),
            ..WebhookConfig::default()
        };
        let err = WebhookClient::new(&config).expect_err("invalid header");
        assert!(matches!(err, AuditError::Configuration(_)));
    }
}
