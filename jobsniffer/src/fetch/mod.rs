//! Page fetching.
//!
//! This module provides:
//! - The [`Fetcher`] protocol and the [`FetchedPage`] it returns
//! - An HTTP implementation backed by reqwest (feature `http`)
//! - Retries with backoff and jitter, each attempt bounded by a timeout

#[cfg(feature = "http")]
mod http;
mod protocols;
mod retry;

#[cfg(feature = "http")]
pub use http::HttpFetcher;
#[cfg(test)]
pub use protocols::MockFetcher;
pub use protocols::{FetchedPage, Fetcher, RenderMode};
pub use retry::{
    fetch_with_retry, should_retry, BackoffStrategy, JitterStrategy, RetryConfig, RetryDecision,
};
