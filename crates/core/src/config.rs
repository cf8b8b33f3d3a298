//! Session configuration and its validation

use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Trait for validating configuration values
pub trait ValidateConfig: Serialize + for<'de> Deserialize<'de> {
    /// Returns Ok(()) if valid, or an error describing what's wrong
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Common validation helpers
pub mod validators {
    use config::ConfigError;

    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field: &str) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::Message(format!("{field}: cannot be empty")));
        }
        Ok(())
    }

    /// Validate an http(s) URL
    pub fn validate_http_url(value: &str, field: &str) -> Result<(), ConfigError> {
        let url = url::Url::parse(value)
            .map_err(|e| ConfigError::Message(format!("{field}: invalid URL - {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "{field}: scheme must be http or https"
            )));
        }
        Ok(())
    }

    /// Validate that a value is within range
    pub fn validate_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<(), ConfigError> {
        if value < min || value > max {
            return Err(ConfigError::Message(format!(
                "{field}: must be between {min} and {max}"
            )));
        }
        Ok(())
    }
}

/// Tunables of the session lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Backend API root, e.g. `http://localhost:8080/api`
    pub base_url: String,
    /// How long before access-token expiry the renewal runs
    pub refresh_lead_secs: u64,
    /// Inactivity that ends the session
    pub idle_limit_ms: u64,
    /// Granularity of the idle counter
    pub idle_tick_ms: u64,
    /// Reconnect retries of a refresh that failed offline
    pub max_refresh_retries: u32,
    /// Request timeout (native only)
    pub request_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_lead_secs: 60,
            idle_limit_ms: 600_000,
            idle_tick_ms: 60_000,
            max_refresh_retries: 3,
            request_timeout_secs: 30,
        }
    }
}

impl SessionConfig {
    pub fn refresh_lead(&self) -> Duration {
        Duration::from_secs(self.refresh_lead_secs)
    }

    pub fn idle_limit(&self) -> Duration {
        Duration::from_millis(self.idle_limit_ms)
    }

    pub fn idle_tick(&self) -> Duration {
        Duration::from_millis(self.idle_tick_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ValidateConfig for SessionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        use validators::*;

        validate_not_empty(&self.base_url, "base_url")?;
        validate_http_url(&self.base_url, "base_url")?;
        validate_range(self.idle_tick_ms, 1, self.idle_limit_ms.max(1), "idle_tick_ms")?;
        validate_range(self.max_refresh_retries, 1, 100, "max_refresh_retries")?;
        validate_range(self.request_timeout_secs, 1, 600, "request_timeout_secs")?;
        validate_range(self.refresh_lead_secs, 0, 3_600, "refresh_lead_secs")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.idle_limit(), Duration::from_secs(600));
        assert_eq!(config.idle_tick(), Duration::from_secs(60));
        assert_eq!(config.refresh_lead(), Duration::from_secs(60));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let config = SessionConfig {
            base_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn tick_cannot_exceed_limit() {
        let config = SessionConfig {
            idle_limit_ms: 1_000,
            idle_tick_ms: 5_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_retries_rejected() {
        let config = SessionConfig {
            max_refresh_retries: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"base_url":"https://api.example.com"}"#).unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.max_refresh_retries, 3);
    }
}
