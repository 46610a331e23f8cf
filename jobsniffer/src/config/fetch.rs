//! Configuration for HTTP fetching.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::ConfigurationError;

/// Upper bound for any configured time value, in seconds.
pub const MAX_TIMEOUT_SECONDS: f64 = 86_400.0;

/// Configuration for HTTP fetching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-fetch time bound in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: f64,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Additional headers to include.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Base URL of a headless-browser render service.
    ///
    /// Script-rendered pages are fetched as `GET {endpoint}?url=<page>&wait=<seconds>`.
    /// Without an endpoint, script-rendered fetches fail softly.
    #[serde(default)]
    pub render_endpoint: Option<String>,
    /// Seconds the render service should wait for scripts to settle.
    #[serde(default = "default_render_wait")]
    pub render_wait_seconds: f64,
}

fn default_timeout() -> f64 {
    30.0
}

fn default_connect_timeout() -> f64 {
    10.0
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    concat!("jobsniffer/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_render_wait() -> f64 {
    2.0
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            headers: HashMap::new(),
            render_endpoint: None,
            render_wait_seconds: default_render_wait(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the render service endpoint.
    #[must_use]
    pub fn with_render_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.render_endpoint = Some(endpoint.into());
        self
    }

    /// Gets timeout as Duration. Out-of-range values fall back to the default.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        seconds(self.timeout_seconds).unwrap_or_else(|| Duration::from_secs_f64(default_timeout()))
    }

    /// Gets connect timeout as Duration. Out-of-range values fall back to the default.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        seconds(self.connect_timeout_seconds)
            .unwrap_or_else(|| Duration::from_secs_f64(default_connect_timeout()))
    }

    /// Checks that every time value is positive and at most [`MAX_TIMEOUT_SECONDS`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_seconds("fetch.timeout_seconds", self.timeout_seconds)?;
        check_seconds("fetch.connect_timeout_seconds", self.connect_timeout_seconds)?;
        if !(self.render_wait_seconds.is_finite()
            && (0.0..=MAX_TIMEOUT_SECONDS).contains(&self.render_wait_seconds))
        {
            return Err(ConfigurationError::new(format!(
                "fetch.render_wait_seconds must be between 0 and {MAX_TIMEOUT_SECONDS}"
            ))
            .with_field("fetch.render_wait_seconds"));
        }
        Ok(())
    }
}

fn seconds(value: f64) -> Option<Duration> {
    if value > 0.0 && value <= MAX_TIMEOUT_SECONDS {
        Duration::try_from_secs_f64(value).ok()
    } else {
        None
    }
}

fn check_seconds(field: &str, value: f64) -> Result<(), ConfigurationError> {
    if seconds(value).is_some() {
        return Ok(());
    }
    Err(ConfigurationError::new(format!(
        "{field} must be greater than 0 and at most {MAX_TIMEOUT_SECONDS}, got {value}"
    ))
    .with_field(field)
    .with_fix_hint("Use a number of seconds such as 30."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout_seconds, 30.0);
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("jobsniffer/"));
        assert!(config.render_endpoint.is_none());
    }

    #[test]
    fn test_fetch_config_builder() {
        let config = FetchConfig::new()
            .with_timeout(5.5)
            .with_user_agent("custom-agent")
            .with_header("Accept-Language", "fr-FR")
            .with_render_endpoint("http://localhost:8050/render.html");

        assert_eq!(config.timeout(), Duration::from_millis(5500));
        assert_eq!(config.user_agent, "custom-agent");
        assert_eq!(config.headers.get("Accept-Language"), Some(&"fr-FR".to_string()));
        assert_eq!(
            config.render_endpoint.as_deref(),
            Some("http://localhost:8050/render.html")
        );
    }

    #[test]
    fn test_fetch_config_partial_json_uses_defaults() {
        let config: FetchConfig = serde_json::from_str(r#"{"timeout_seconds": 12}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(12));
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.render_wait_seconds, 2.0);
    }

    #[test]
    fn test_out_of_range_timeouts_rejected() {
        let huge = FetchConfig::new().with_timeout(1e300);
        assert_eq!(
            huge.validate().unwrap_err().field.as_deref(),
            Some("fetch.timeout_seconds")
        );
        assert_eq!(huge.timeout(), Duration::from_secs(30));

        let mut config = FetchConfig::new();
        config.connect_timeout_seconds = f64::INFINITY;
        assert_eq!(
            config.validate().unwrap_err().field.as_deref(),
            Some("fetch.connect_timeout_seconds")
        );
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));

        config.connect_timeout_seconds = 0.0;
        assert!(config.validate().is_err());
        assert!(FetchConfig::new().validate().is_ok());
    }
}
