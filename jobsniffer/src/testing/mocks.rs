//! Canned fetchers for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::errors::FetchError;
use crate::fetch::{FetchedPage, Fetcher, RenderMode};

#[derive(Debug, Clone)]
enum Canned {
    Page(FetchedPage),
    Failure(FetchError),
}

/// A fetcher that serves canned pages by URL and records every call.
///
/// Unknown URLs answer with a 404 status failure.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Canned>,
    delays: HashMap<String, Duration>,
    default_delay: Option<Duration>,
    calls: Mutex<Vec<(Url, RenderMode)>>,
}

impl StaticFetcher {
    /// Creates an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` as HTML at `url`.
    #[must_use]
    pub fn with_page(self, url: &str, body: impl Into<String>) -> Self {
        match Url::parse(url) {
            Ok(parsed) => self.with_response(FetchedPage::html(parsed, body)),
            Err(_) => self,
        }
    }

    /// Serves a prepared page at its requested URL.
    #[must_use]
    pub fn with_response(mut self, page: FetchedPage) -> Self {
        self.responses
            .insert(page.requested_url.to_string(), Canned::Page(page));
        self
    }

    /// Fails every fetch of `url` with `error`.
    #[must_use]
    pub fn with_failure(mut self, url: &str, error: FetchError) -> Self {
        self.responses.insert(normalize(url), Canned::Failure(error));
        self
    }

    /// Delays answers for `url`.
    #[must_use]
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(normalize(url), delay);
        self
    }

    /// Delays every answer without a URL-specific delay.
    #[must_use]
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    /// URLs fetched so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<Url> {
        self.calls.lock().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Render modes used so far, in call order.
    #[must_use]
    pub fn render_modes(&self) -> Vec<RenderMode> {
        self.calls.lock().iter().map(|(_, mode)| *mode).collect()
    }

    /// Number of fetches so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of fetches of `url` so far.
    #[must_use]
    pub fn calls_to(&self, url: &str) -> usize {
        let key = normalize(url);
        self.calls
            .lock()
            .iter()
            .filter(|(called, _)| called.as_str() == key)
            .count()
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), |u| u.to_string())
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(
        &self,
        url: &Url,
        mode: RenderMode,
        _timeout: Duration,
    ) -> Result<FetchedPage, FetchError> {
        self.calls.lock().push((url.clone(), mode));

        let key = url.to_string();
        if let Some(delay) = self.delays.get(&key).copied().or(self.default_delay) {
            tokio::time::sleep(delay).await;
        }

        match self.responses.get(&key) {
            Some(Canned::Page(page)) => Ok(page.clone()),
            Some(Canned::Failure(error)) => Err(error.clone()),
            None => Err(FetchError::Status {
                status: 404,
                url: key,
            }),
        }
    }
}
