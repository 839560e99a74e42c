//! Non-secret wrapper settings.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the client and the built-in actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the Twitter v2 API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Default polling interval for mentions monitors, in seconds.
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.twitter.com/2".to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_monitor_interval() -> u64 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            monitor_interval_secs: default_monitor_interval(),
        }
    }
}

impl Settings {
    /// Creates default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Sets the default monitor interval.
    #[must_use]
    pub const fn with_monitor_interval_secs(mut self, secs: u64) -> Self {
        self.monitor_interval_secs = secs;
        self
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the default monitor interval.
    #[must_use]
    pub const fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }

    /// Checks that the settings can drive a client and a monitor.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Invalid` for a zero timeout or interval.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigurationError::invalid(
                "request_timeout_secs must be at least 1",
            ));
        }
        if self.monitor_interval_secs == 0 {
            return Err(ConfigurationError::invalid(
                "monitor_interval_secs must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, "https://api.twitter.com/2");
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.monitor_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"monitor_interval_secs": 5}"#).unwrap();
        assert_eq!(settings.monitor_interval_secs, 5);
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        assert!(Settings::default().validate().is_ok());

        let err = Settings::new().with_monitor_interval_secs(0).validate().unwrap_err();
        assert!(err.to_string().contains("monitor_interval_secs"));

        let err = Settings::new().with_request_timeout_secs(0).validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));
    }
}
