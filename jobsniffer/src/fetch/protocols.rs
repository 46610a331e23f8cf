//! Page fetching protocol.
//!
//! The crawl engine never talks to the network directly: it asks a [`Fetcher`]
//! for pages, so the transport (plain HTTP, a headless-browser render service,
//! canned pages in tests) is pluggable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::errors::FetchError;

/// Whether a page needs its scripts executed before it can be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Plain HTTP retrieval is enough.
    #[default]
    Plain,
    /// The page is built client-side and must go through a headless browser.
    Script,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Script => write!(f, "script"),
        }
    }
}

/// A page returned by a [`Fetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// The URL that was requested.
    pub requested_url: Url,
    /// Final URL after redirects.
    pub final_url: Url,
    /// HTTP status code.
    pub status_code: u16,
    /// Content type from headers.
    pub content_type: Option<String>,
    /// Response body as text.
    pub body: String,
    /// Time taken to fetch in milliseconds.
    pub duration_ms: u64,
}

impl FetchedPage {
    /// Creates a successful HTML page served from `url` without redirects.
    #[must_use]
    pub fn html(url: Url, body: impl Into<String>) -> Self {
        Self {
            requested_url: url.clone(),
            final_url: url,
            status_code: 200,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into(),
            duration_ms: 0,
        }
    }

    /// Sets the final URL, as if the request had been redirected.
    #[must_use]
    pub fn redirected_to(mut self, final_url: Url) -> Self {
        self.final_url = final_url;
        self
    }

    /// Whether the response is HTML.
    ///
    /// A missing content type is given the benefit of the doubt.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_ref()
            .map_or(true, |ct| ct.contains("text/html") || ct.contains("application/xhtml"))
    }

    /// Whether the fetch was successful (2xx status).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Protocol for page fetching.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL in the given render mode, bounded by `timeout`.
    ///
    /// Implementations return an error for non-success statuses.
    async fn fetch(
        &self,
        url: &Url,
        mode: RenderMode,
        timeout: Duration,
    ) -> Result<FetchedPage, FetchError>;
}
