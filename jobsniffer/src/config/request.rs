//! Crawl requests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::SourceId;
use crate::errors::ConfigurationError;

/// What to crawl: the search terms, the page bound and the sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// Job title query.
    pub job_title: String,
    /// Location query.
    pub location: String,
    /// Maximum listing pages per source, at least 1.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Enabled sources.
    pub sources: BTreeSet<SourceId>,
}

fn default_max_pages() -> u32 {
    5
}

impl CrawlRequest {
    /// Creates a request with no sources enabled.
    #[must_use]
    pub fn new(job_title: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            location: location.into(),
            max_pages: default_max_pages(),
            sources: BTreeSet::new(),
        }
    }

    /// Sets the page bound.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Enables a source.
    #[must_use]
    pub fn with_source(mut self, source: SourceId) -> Self {
        self.sources.insert(source);
        self
    }

    /// Enables several sources.
    #[must_use]
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = SourceId>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Checks the request before any fetch is issued.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_pages < 1 {
            return Err(ConfigurationError::new("max_pages must be at least 1")
                .with_field("max_pages")
                .with_fix_hint("Request one page or more."));
        }
        if self.sources.is_empty() {
            return Err(ConfigurationError::new("No sources enabled")
                .with_field("sources")
                .with_fix_hint("Enable at least one of: hellowork, wttj."));
        }
        Ok(())
    }
}
