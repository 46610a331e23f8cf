//! Retry policy for page fetches.
//!
//! Transient failures (transport errors, timeouts) and a configurable set of
//! HTTP statuses are retried with backoff and jitter. Everything else is
//! returned to the caller on the first attempt.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{FetchedPage, Fetcher, RenderMode};
use crate::errors::FetchError;

/// Backoff strategy for retry delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// delay = base * 2^retry
    #[default]
    Exponential,
    /// delay = base * (retry + 1)
    Linear,
    /// delay = base
    Constant,
}

/// Jitter applied on top of the backoff delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JitterStrategy {
    /// No jitter
    None,
    /// Random from 0 to delay
    #[default]
    Full,
    /// Half fixed, half random
    Equal,
}

/// Configuration for fetch retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per URL, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay between attempts in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Backoff strategy.
    #[serde(default)]
    pub backoff_strategy: BackoffStrategy,
    /// Jitter strategy.
    #[serde(default)]
    pub jitter_strategy: JitterStrategy,
    /// HTTP statuses worth another attempt.
    #[serde(default = "default_retry_status_codes")]
    pub retry_status_codes: Vec<u16>,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_retry_status_codes() -> Vec<u16> {
    vec![429, 500, 502, 503, 504, 522, 524, 408]
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_strategy: BackoffStrategy::default(),
            jitter_strategy: JitterStrategy::default(),
            retry_status_codes: default_retry_status_codes(),
        }
    }
}

impl RetryConfig {
    /// Creates a new retry config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A config that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Sets the maximum attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the base delay.
    #[must_use]
    pub fn with_base_delay_ms(mut self, delay: u64) -> Self {
        self.base_delay_ms = delay;
        self
    }

    /// Sets the maximum delay.
    #[must_use]
    pub fn with_max_delay_ms(mut self, delay: u64) -> Self {
        self.max_delay_ms = delay;
        self
    }

    /// Sets the backoff strategy.
    #[must_use]
    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff_strategy = strategy;
        self
    }

    /// Sets the jitter strategy.
    #[must_use]
    pub fn with_jitter(mut self, strategy: JitterStrategy) -> Self {
        self.jitter_strategy = strategy;
        self
    }

    /// Whether `error` should be retried at all.
    #[must_use]
    pub fn is_retryable(&self, error: &FetchError) -> bool {
        match error {
            FetchError::Status { status, .. } => self.retry_status_codes.contains(status),
            other => other.is_transient(),
        }
    }

    /// Delay before retry number `retry` (0 for the first retry).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base = self.base_delay_ms;
        let max = self.max_delay_ms;

        let delay = match self.backoff_strategy {
            BackoffStrategy::Exponential => base.saturating_mul(2u64.saturating_pow(retry)).min(max),
            BackoffStrategy::Linear => base.saturating_mul(u64::from(retry) + 1).min(max),
            BackoffStrategy::Constant => base.min(max),
        };

        let jittered = match self.jitter_strategy {
            JitterStrategy::None => delay,
            JitterStrategy::Full => {
                if delay == 0 {
                    0
                } else {
                    rand::thread_rng().gen_range(0..=delay)
                }
            }
            JitterStrategy::Equal => {
                let half = delay / 2;
                if half == 0 {
                    delay
                } else {
                    half + rand::thread_rng().gen_range(0..=half)
                }
            }
        };

        Duration::from_millis(jittered)
    }
}

/// Outcome of a retry decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry(Duration),
    /// No more attempts left.
    GiveUp,
    /// The error is not retryable.
    NotRetryable,
}

/// Decides what to do after attempt number `attempt` (1-based) failed with `error`.
#[must_use]
pub fn should_retry(config: &RetryConfig, attempt: u32, error: &FetchError) -> RetryDecision {
    if !config.is_retryable(error) {
        return RetryDecision::NotRetryable;
    }
    if attempt >= config.max_attempts {
        return RetryDecision::GiveUp;
    }
    RetryDecision::Retry(config.delay_for(attempt.saturating_sub(1)))
}

/// Fetches `url`, retrying retryable failures according to `config`.
///
/// Every attempt is bounded by `timeout`; an attempt that overruns it fails
/// with [`FetchError::Timeout`]. Callers race the whole call against
/// cancellation, which also abandons pending backoff sleeps.
pub async fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    url: &Url,
    mode: RenderMode,
    timeout: Duration,
    config: &RetryConfig,
) -> Result<FetchedPage, FetchError> {
    let mut attempt = 1;
    loop {
        let error = match tokio::time::timeout(timeout, fetcher.fetch(url, mode, timeout)).await {
            Ok(Ok(page)) => return Ok(page),
            Ok(Err(e)) => e,
            Err(_) => FetchError::Timeout(timeout),
        };

        match should_retry(config, attempt, &error) {
            RetryDecision::Retry(delay) => {
                tracing::debug!(
                    url = %url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retrying fetch"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            RetryDecision::GiveUp | RetryDecision::NotRetryable => return Err(error),
        }
    }
}
