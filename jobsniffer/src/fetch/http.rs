//! reqwest-backed fetcher.
//!
//! Plain pages are fetched directly. Script-rendered pages are delegated to a
//! render service (any HTTP endpoint that takes `url` and `wait` query
//! parameters and answers with the rendered HTML).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::time::{Duration, Instant};
use url::Url;

use super::{FetchedPage, Fetcher, RenderMode};
use crate::config::FetchConfig;
use crate::errors::{ConfigurationError, FetchError};

/// HTTP fetcher built on a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    render_endpoint: Option<Url>,
    render_wait_seconds: f64,
}

impl HttpFetcher {
    /// Builds a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let mut headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                ConfigurationError::new(format!("Invalid header name '{key}': {e}"))
                    .with_field("fetch.headers")
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ConfigurationError::new(format!("Invalid value for header '{key}': {e}"))
                    .with_field("fetch.headers")
            })?;
            headers.insert(name, value);
        }

        let render_endpoint = config
            .render_endpoint
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| {
                    ConfigurationError::new(format!("Invalid render endpoint '{raw}': {e}"))
                        .with_field("fetch.render_endpoint")
                })
            })
            .transpose()?;

        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(config.connect_timeout())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ConfigurationError::new(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            render_endpoint,
            render_wait_seconds: config.render_wait_seconds,
        })
    }

    /// Whether script-rendered pages can be fetched.
    #[must_use]
    pub fn can_render(&self) -> bool {
        self.render_endpoint.is_some()
    }

    fn render_url(&self, url: &Url) -> Result<Url, FetchError> {
        let mut endpoint = self
            .render_endpoint
            .clone()
            .ok_or(FetchError::RenderUnavailable)?;
        endpoint
            .query_pairs_mut()
            .append_pair("url", url.as_str())
            .append_pair("wait", &self.render_wait_seconds.to_string());
        Ok(endpoint)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &Url,
        mode: RenderMode,
        timeout: Duration,
    ) -> Result<FetchedPage, FetchError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let target = match mode {
            RenderMode::Plain => url.clone(),
            RenderMode::Script => self.render_url(url)?,
        };

        let start = Instant::now();
        let response = self
            .client
            .get(target)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // The render service answers from its own URL; the page keeps the requested one.
        let final_url = match mode {
            RenderMode::Plain => response.url().clone(),
            RenderMode::Script => url.clone(),
        };
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(&e, timeout))?;

        Ok(FetchedPage {
            requested_url: url.clone(),
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn map_reqwest_error(error: &reqwest::Error, timeout: Duration) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(timeout)
    } else {
        FetchError::Http(error.to_string())
    }
}
