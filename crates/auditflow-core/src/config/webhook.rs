use reqwest::Url;

use crate::error::{AuditError, Result};

use super::env::{normalize_non_empty, read_env_u64, read_non_empty_env};

const ENV_ADVISOR_WEBHOOK_URL: &str = "AUDITFLOW_ADVISOR_WEBHOOK_URL";
const ENV_EMAIL_WEBHOOK_URL: &str = "AUDITFLOW_EMAIL_WEBHOOK_URL";
const ENV_NOTIFY_WEBHOOK_URL: &str = "AUDITFLOW_NOTIFY_WEBHOOK_URL";
const ENV_WEBHOOK_API_KEY: &str = "AUDITFLOW_WEBHOOK_API_KEY";
const ENV_WEBHOOK_TIMEOUT_MS: &str = "AUDITFLOW_WEBHOOK_TIMEOUT_MS";

pub const DEFAULT_WEBHOOK_TIMEOUT_MS: u64 = 10_000;
pub const API_KEY_HEADER: &str = "x-api-key";

/// Outbound automation endpoints. Every URL is optional; features whose
/// endpoint is missing degrade as documented on the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub advisor_url: Option<Url>,
    pub email_url: Option<Url>,
    pub notify_url: Option<Url>,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            advisor_url: None,
            email_url: None,
            notify_url: None,
            api_key: None,
            timeout_ms: DEFAULT_WEBHOOK_TIMEOUT_MS,
        }
    }
}

impl WebhookConfig {
    pub(super) fn from_env() -> Result<Self> {
        Ok(Self {
            advisor_url: parse_webhook_url(
                read_non_empty_env(ENV_ADVISOR_WEBHOOK_URL).as_deref(),
                ENV_ADVISOR_WEBHOOK_URL,
            )?,
            email_url: parse_webhook_url(
                read_non_empty_env(ENV_EMAIL_WEBHOOK_URL).as_deref(),
                ENV_EMAIL_WEBHOOK_URL,
            )?,
            notify_url: parse_webhook_url(
                read_non_empty_env(ENV_NOTIFY_WEBHOOK_URL).as_deref(),
                ENV_NOTIFY_WEBHOOK_URL,
            )?,
            api_key: read_non_empty_env(ENV_WEBHOOK_API_KEY),
            timeout_ms: read_env_u64(ENV_WEBHOOK_TIMEOUT_MS)
                .filter(|value| *value > 0)
                .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_MS),
        })
    }
}

/// Parse an optional webhook endpoint, rejecting non-HTTP schemes and
/// embedded credentials.
pub fn parse_webhook_url(raw: Option<&str>, label: &str) -> Result<Option<Url>> {
    let Some(raw) = normalize_non_empty(raw) else {
        return Ok(None);
    };
    let url = Url::parse(&raw)
        .map_err(|err| AuditError::Configuration(format!("invalid {label}: {err}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AuditError::Configuration(format!(
                "unsupported {label} scheme: {other}"
            )));
        }
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(AuditError::Configuration(format!(
            "{label} must not include credentials"
        )));
    }
    Ok(Some(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_url_is_absent() {
        assert_eq!(parse_webhook_url(None, "x").expect("none"), None);
        assert_eq!(parse_webhook_url(Some("   "), "x").expect("blank"), None);
    }

    #[test]
    fn accepts_https_endpoint() {
        let url = parse_webhook_url(Some(" https://hooks.example.com/audit "), "x")
            .expect("parse")
            .expect("present");
        assert_eq!(url.host_str(), Some("hooks.example.com"));
    }

    #[test]
    fn rejects_other_schemes_and_credentials() {
        let err = parse_webhook_url(Some("ftp://hooks.example.com"), "EMAIL")
            .expect_err("ftp must fail");
        assert!(matches!(err, AuditError::Configuration(_)));

        let err = parse_webhook_url(Some("https://user:pw@hooks.example.com"), "EMAIL")
            .expect_err("credentials must fail");
        assert!(err.to_string().contains("credentials"));
    }
}
