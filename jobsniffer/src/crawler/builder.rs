//! Crawler builder with validation.

use std::sync::Arc;

use super::Crawler;
use crate::config::CrawlerConfig;
use crate::errors::ConfigurationError;
use crate::events::{EventSink, NoOpEventSink};
use crate::fetch::Fetcher;
use crate::sources::{SourceProfile, SourceRegistry};

/// Builder for creating validated crawlers.
#[derive(Default)]
pub struct CrawlerBuilder {
    config: CrawlerConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
    events: Option<Arc<dyn EventSink>>,
}

impl CrawlerBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: CrawlerConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a source profile override.
    #[must_use]
    pub fn with_source_profile(mut self, profile: SourceProfile) -> Self {
        self.config.sources.push(profile);
        self
    }

    /// Sets the page fetcher. Without one, an HTTP fetcher is built from
    /// the fetch configuration.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Validates configuration and source profiles and builds the crawler.
    pub fn build(self) -> Result<Crawler, ConfigurationError> {
        self.config.validate()?;
        let registry = SourceRegistry::with_overrides(&self.config.sources)?;
        let fetcher = match self.fetcher {
            Some(fetcher) => fetcher,
            None => default_fetcher(&self.config)?,
        };
        let events = self
            .events
            .unwrap_or_else(|| Arc::new(NoOpEventSink) as Arc<dyn EventSink>);

        Ok(Crawler::new(self.config, registry, fetcher, events))
    }
}

#[cfg(feature = "http")]
fn default_fetcher(config: &CrawlerConfig) -> Result<Arc<dyn Fetcher>, ConfigurationError> {
    Ok(Arc::new(crate::fetch::HttpFetcher::new(&config.fetch)?))
}

#[cfg(not(feature = "http"))]
fn default_fetcher(_config: &CrawlerConfig) -> Result<Arc<dyn Fetcher>, ConfigurationError> {
    Err(ConfigurationError::new("No fetcher configured")
        .with_field("fetcher")
        .with_fix_hint("Enable the `http` feature or pass a fetcher with `with_fetcher`."))
}

impl std::fmt::Debug for CrawlerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlerBuilder")
            .field("config", &self.config)
            .field("has_fetcher", &self.fetcher.is_some())
            .field("has_event_sink", &self.events.is_some())
            .finish()
    }
}
