use chrono::{DateTime, Utc};

use crate::config::RateLimitConfig;
use crate::error::Result;
use crate::state::SqliteStateStore;

/// Fixed-window request counter persisted next to the sessions.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: SqliteStateStore,
    config: RateLimitConfig,
}

impl RateLimiter {
    #[must_use]
    pub const fn new(store: SqliteStateStore, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// `true` when the request may proceed. `key` is a session id or a client
    /// address depending on `is_ip`.
    pub fn check_rate_limit(&self, key: &str, is_ip: bool) -> Result<bool> {
        self.check_rate_limit_at(key, is_ip, Utc::now())
    }

    pub fn check_rate_limit_at(&self, key: &str, is_ip: bool, now: DateTime<Utc>) -> Result<bool> {
        let window_secs = i64::try_from(self.config.window_secs.max(1)).unwrap_or(i64::MAX);
        let window_start = now.timestamp().div_euclid(window_secs) * window_secs;
        let scoped_key = if is_ip {
            format!("ip:{key}")
        } else {
            format!("session:{key}")
        };
        self.store.record_rate_limit_hit(
            &scoped_key,
            window_start,
            window_secs,
            self.config.limit_for(is_ip),
        )
    }
}
