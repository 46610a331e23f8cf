//! Engine configuration and crawl requests.

mod fetch;
mod request;

pub use fetch::FetchConfig;
pub use request::CrawlRequest;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{ConfigurationError, CrawlError};
use crate::fetch::RetryConfig;
use crate::sources::SourceProfile;

/// Engine-wide configuration, independent of any single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// HTTP fetching.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Fetch retries.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Maximum concurrent detail fetches per listing page.
    #[serde(default = "default_detail_concurrency")]
    pub detail_concurrency: usize,
    /// Capacity of the merged record channel.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Profiles replacing the built-in ones, matched by source id.
    #[serde(default)]
    pub sources: Vec<SourceProfile>,
}

fn default_detail_concurrency() -> usize {
    8
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            retry: RetryConfig::default(),
            detail_concurrency: default_detail_concurrency(),
            channel_capacity: default_channel_capacity(),
            sources: Vec::new(),
        }
    }
}

impl CrawlerConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fetch configuration.
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Sets the retry configuration.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the detail fetch concurrency.
    #[must_use]
    pub fn with_detail_concurrency(mut self, concurrency: usize) -> Self {
        self.detail_concurrency = concurrency;
        self
    }

    /// Sets the record channel capacity.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Adds a source profile override.
    #[must_use]
    pub fn with_source_profile(mut self, profile: SourceProfile) -> Self {
        self.sources.push(profile);
        self
    }

    /// Parses a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, CrawlError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CrawlError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Checks numeric bounds.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.detail_concurrency == 0 {
            return Err(ConfigurationError::new("detail_concurrency must be at least 1")
                .with_field("detail_concurrency"));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigurationError::new("channel_capacity must be at least 1")
                .with_field("channel_capacity"));
        }
        self.fetch.validate()?;
        if self.retry.max_attempts == 0 {
            return Err(ConfigurationError::new("retry.max_attempts must be at least 1")
                .with_field("retry.max_attempts")
                .with_fix_hint("Use 1 to disable retries."));
        }
        Ok(())
    }
}
