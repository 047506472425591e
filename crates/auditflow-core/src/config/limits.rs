use super::env::{parse_list, read_env_u32, read_env_u64, read_non_empty_env};

const ENV_RATE_LIMIT_WINDOW_SECS: &str = "AUDITFLOW_RATE_LIMIT_WINDOW_SECS";
const ENV_RATE_LIMIT_SESSION_MAX: &str = "AUDITFLOW_RATE_LIMIT_SESSION_MAX";
const ENV_RATE_LIMIT_IP_MAX: &str = "AUDITFLOW_RATE_LIMIT_IP_MAX";
const ENV_SESSION_TTL_SECS: &str = "AUDITFLOW_SESSION_TTL_SECS";
const ENV_ALLOWED_ORIGINS: &str = "AUDITFLOW_ALLOWED_ORIGINS";

pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
pub const DEFAULT_RATE_LIMIT_SESSION_MAX: u32 = 20;
pub const DEFAULT_RATE_LIMIT_IP_MAX: u32 = 60;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub session_max: u32,
    pub ip_max: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
            session_max: DEFAULT_RATE_LIMIT_SESSION_MAX,
            ip_max: DEFAULT_RATE_LIMIT_IP_MAX,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub(super) fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            window_secs: read_env_u64(ENV_RATE_LIMIT_WINDOW_SECS)
                .filter(|value| *value > 0)
                .unwrap_or(defaults.window_secs),
            session_max: read_env_u32(ENV_RATE_LIMIT_SESSION_MAX)
                .filter(|value| *value > 0)
                .unwrap_or(defaults.session_max),
            ip_max: read_env_u32(ENV_RATE_LIMIT_IP_MAX)
                .filter(|value| *value > 0)
                .unwrap_or(defaults.ip_max),
        }
    }

    #[must_use]
    pub const fn limit_for(&self, is_ip: bool) -> u32 {
        if is_ip { self.ip_max } else { self.session_max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub(super) fn from_env() -> Self {
        Self {
            ttl_secs: read_env_u64(ENV_SESSION_TTL_SECS)
                .filter(|value| *value > 0)
                .unwrap_or(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebConfig {
    /// Origins allowed to POST. Empty disables the origin guard.
    pub allowed_origins: Vec<String>,
}

impl WebConfig {
    #[must_use]
    pub(super) fn from_env() -> Self {
        Self {
            allowed_origins: parse_list(read_non_empty_env(ENV_ALLOWED_ORIGINS).as_deref()),
        }
    }

    #[must_use]
    pub fn allows_origin(&self, origin: &str) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }
        let origin = origin.trim().trim_end_matches('/');
        self.allowed_origins
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_picks_limit_by_key_kind() {
        let config = RateLimitConfig {
            window_secs: 60,
            session_max: 3,
            ip_max: 9,
        };
        assert_eq!(config.limit_for(false), 3);
        assert_eq!(config.limit_for(true), 9);
    }

    #[test]
    fn origin_guard_is_open_without_allow_list() {
        assert!(WebConfig::default().allows_origin("https://anything.example"));
    }

    #[test]
    fn origin_guard_matches_normalized_entries() {
        let config = WebConfig {
            allowed_origins: parse_list(Some("https://site.example/, https://www.site.example")),
        };
        assert!(config.allows_origin("https://site.example"));
        assert!(config.allows_origin("HTTPS://WWW.SITE.EXAMPLE/"));
        assert!(!config.allows_origin("https://evil.example"));
    }
}
