use crate::error::Result;

mod env;
mod limits;
mod webhook;

pub use limits::{
    DEFAULT_RATE_LIMIT_IP_MAX, DEFAULT_RATE_LIMIT_SESSION_MAX, DEFAULT_RATE_LIMIT_WINDOW_SECS,
    DEFAULT_SESSION_TTL_SECS, RateLimitConfig, SessionConfig, WebConfig,
};
pub use webhook::{API_KEY_HEADER, DEFAULT_WEBHOOK_TIMEOUT_MS, WebhookConfig, parse_webhook_url};

/// Runtime configuration, assembled once at startup and injected into the
/// service and router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub webhooks: WebhookConfig,
    pub rate_limit: RateLimitConfig,
    pub session: SessionConfig,
    pub web: WebConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            webhooks: WebhookConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env(),
            session: SessionConfig::from_env(),
            web: WebConfig::from_env(),
        })
    }
}
