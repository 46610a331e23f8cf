//! Error types for the crawl engine.
//!
//! Field-level problems (a selector that matches nothing, a title without a
//! delimiter) are never errors: they degrade to absent values on the record.
//! Fetch and parse failures are soft and per URL. Only configuration errors
//! abort a crawl, and they do so before the first request is issued.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// The main error type for crawl operations.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The crawl request or engine configuration is invalid.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// A page could not be fetched.
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// Fetched content could not be treated as an HTML document.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// The crawl was cancelled.
    #[error("Crawl cancelled: {0}")]
    Cancelled(String),

    /// A record sink rejected a record.
    #[error("Record sink error: {0}")]
    Sink(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error raised when a crawl request or configuration is rejected.
///
/// This is the only fatal error kind: it is returned before any fetch is issued.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ConfigurationError {
    /// The error message.
    pub message: String,
    /// The offending field, if one can be named.
    pub field: Option<String>,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
}

impl ConfigurationError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
            fix_hint: None,
        }
    }

    /// Sets the offending field.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("message".to_string(), serde_json::json!(self.message));
        if let Some(ref field) = self.field {
            map.insert("field".to_string(), serde_json::json!(field));
        }
        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::json!(hint));
        }
        map
    }
}

/// Error returned by a page fetch.
///
/// Every variant is a soft, per-URL failure from the crawl's point of view.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The URL could not be parsed or is not fetchable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (DNS, connection reset, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("Unexpected status {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The URL that produced the status.
        url: String,
    },

    /// The fetch exceeded its time bound.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// A script-rendered page was requested but no render service is configured.
    #[error("No render service configured for script-rendered pages")]
    RenderUnavailable,

    /// The fetch was abandoned because the crawl was cancelled.
    #[error("Fetch abandoned: {0}")]
    Cancelled(String),
}

impl FetchError {
    /// Short machine-readable label for summaries and events.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid_url",
            Self::Http(_) => "http",
            Self::Status { .. } => "status",
            Self::Timeout(_) => "timeout",
            Self::RenderUnavailable => "render_unavailable",
            Self::Cancelled(_) => "cancelled",
        }
    }

    /// Whether the failure is worth retrying regardless of status policy.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout(_))
    }
}

/// Error raised when fetched content cannot be used as an HTML document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The response declared a non-HTML content type.
    #[error("Unsupported content type '{content_type}' at {url}")]
    NotHtml {
        /// The page URL.
        url: String,
        /// The declared content type.
        content_type: String,
    },

    /// The response body was empty.
    #[error("Empty document body at {0}")]
    EmptyBody(String),
}

/// Result type alias for crawl operations.
pub type Result<T> = std::result::Result<T, CrawlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_builder() {
        let err = ConfigurationError::new("max_pages must be at least 1")
            .with_field("max_pages")
            .with_fix_hint("Request one page or more.");

        assert_eq!(err.to_string(), "max_pages must be at least 1");
        assert_eq!(err.field.as_deref(), Some("max_pages"));

        let dict = err.to_dict();
        assert_eq!(dict.get("field"), Some(&serde_json::json!("max_pages")));
        assert!(dict.contains_key("fix_hint"));
    }

    #[test]
    fn test_crawl_error_from_configuration() {
        let err: CrawlError = ConfigurationError::new("no sources enabled").into();
        assert!(matches!(err, CrawlError::Configuration(_)));
        assert_eq!(err.to_string(), "no sources enabled");
    }

    #[test]
    fn test_fetch_error_kinds() {
        assert_eq!(FetchError::Timeout(Duration::from_secs(1)).kind(), "timeout");
        assert_eq!(
            FetchError::Status { status: 503, url: "https://a.test".into() }.kind(),
            "status"
        );
        assert!(FetchError::Http("reset".into()).is_transient());
        assert!(!FetchError::RenderUnavailable.is_transient());
        assert!(!FetchError::Cancelled("stop".into()).is_transient());
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::NotHtml {
            url: "https://a.test/x".into(),
            content_type: "application/pdf".into(),
        };
        assert!(err.to_string().contains("application/pdf"));
    }
}
