//! Typed crawl events.

use serde::{Deserialize, Serialize};

use crate::core::SourceId;
use crate::crawler::SoftFailure;
use crate::pagination::TerminationReason;

/// Something observable that happened during a crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// A source pipeline started.
    SourceStarted {
        /// Source.
        source: SourceId,
        /// First search page.
        url: String,
        /// Page limit.
        max_pages: u32,
    },
    /// A listing page was fetched and parsed.
    PageFetched {
        /// Source.
        source: SourceId,
        /// 1-based page number.
        page: u32,
        /// Page URL.
        url: String,
        /// Item scopes found.
        items_found: usize,
        /// Items dropped for lack of a usable link.
        dropped: usize,
    },
    /// A complete record left a source pipeline.
    RecordEmitted {
        /// Source.
        source: SourceId,
        /// Canonical detail URL.
        url: String,
        /// Record fingerprint.
        fingerprint: String,
    },
    /// A URL was skipped after a soft failure.
    SoftFailure(SoftFailure),
    /// A source pipeline reached a terminal state.
    SourceFinished {
        /// Source.
        source: SourceId,
        /// Listing pages fetched.
        pages_fetched: u32,
        /// Records produced by the pipeline.
        records_produced: usize,
        /// Why pagination stopped.
        termination: TerminationReason,
    },
}

impl CrawlEvent {
    /// Dotted event type, e.g. `crawl.page_fetched`.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SourceStarted { .. } => "crawl.source_started",
            Self::PageFetched { .. } => "crawl.page_fetched",
            Self::RecordEmitted { .. } => "crawl.record_emitted",
            Self::SoftFailure(_) => "crawl.soft_failure",
            Self::SourceFinished { .. } => "crawl.source_finished",
        }
    }

    /// Source the event belongs to.
    #[must_use]
    pub fn source(&self) -> SourceId {
        match self {
            Self::SourceStarted { source, .. }
            | Self::PageFetched { source, .. }
            | Self::RecordEmitted { source, .. }
            | Self::SourceFinished { source, .. } => *source,
            Self::SoftFailure(failure) => failure.source,
        }
    }

    /// Event payload as JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
