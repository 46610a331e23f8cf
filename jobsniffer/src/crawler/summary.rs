//! Soft failures and crawl summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::core::SourceId;
use crate::errors::{FetchError, ParseError};
use crate::pagination::TerminationReason;

/// A URL that was skipped without failing the crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftFailure {
    /// Source whose pipeline hit the failure.
    pub source: SourceId,
    /// The URL that failed.
    pub url: String,
    /// Short failure label (`timeout`, `status`, `parse`, ...).
    pub kind: String,
    /// Human-readable reason.
    pub reason: String,
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
}

impl SoftFailure {
    /// Creates a new failure record stamped with the current time.
    #[must_use]
    pub fn new(
        source: SourceId,
        url: impl Into<String>,
        kind: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source,
            url: url.into(),
            kind: kind.into(),
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }

    /// A failed fetch.
    #[must_use]
    pub fn fetch(source: SourceId, url: impl Into<String>, error: &FetchError) -> Self {
        Self::new(source, url, error.kind(), error.to_string())
    }

    /// A page that could not be parsed.
    #[must_use]
    pub fn parse(source: SourceId, url: impl Into<String>, error: &ParseError) -> Self {
        Self::new(source, url, "parse", error.to_string())
    }
}

/// Collects soft failures for one source pipeline.
#[derive(Debug, Default)]
pub struct FailureCollector {
    failures: Vec<SoftFailure>,
}

impl FailureCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure.
    pub fn record(&mut self, failure: SoftFailure) {
        self.failures.push(failure);
    }

    /// Recorded failures, in order.
    #[must_use]
    pub fn failures(&self) -> &[SoftFailure] {
        &self.failures
    }

    /// Number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Consumes the collector.
    #[must_use]
    pub fn into_failures(self) -> Vec<SoftFailure> {
        self.failures
    }
}

/// Outcome of one source pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    /// Source.
    pub source: SourceId,
    /// Listing pages successfully fetched.
    pub pages_fetched: u32,
    /// Records the pipeline produced.
    pub records_produced: usize,
    /// Records that reached the output stream after de-duplication.
    pub records_delivered: usize,
    /// Detail URLs skipped because the source had already listed them.
    pub duplicates_skipped: usize,
    /// Why pagination stopped.
    pub termination: TerminationReason,
    /// Soft failures, in the order they happened.
    pub failures: Vec<SoftFailure>,
}

impl SourceReport {
    /// An empty report for a source that stopped for `termination`.
    #[must_use]
    pub fn new(source: SourceId, termination: TerminationReason) -> Self {
        Self {
            source,
            pages_fetched: 0,
            records_produced: 0,
            records_delivered: 0,
            duplicates_skipped: 0,
            termination,
            failures: Vec::new(),
        }
    }
}

/// What a crawl run produced, reported once the run is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    /// Run identifier.
    pub run_id: Uuid,
    /// Records delivered to the caller.
    pub records_emitted: usize,
    /// Per-source reports.
    pub sources: BTreeMap<SourceId, SourceReport>,
    /// Every soft failure, tagged by source.
    pub soft_failures: Vec<SoftFailure>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl CrawlSummary {
    /// Builds a summary from finished source reports.
    #[must_use]
    pub fn new(
        run_id: Uuid,
        reports: impl IntoIterator<Item = SourceReport>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let sources: BTreeMap<SourceId, SourceReport> =
            reports.into_iter().map(|r| (r.source, r)).collect();
        let records_emitted = sources.values().map(|r| r.records_delivered).sum();
        let soft_failures = sources
            .values()
            .flat_map(|r| r.failures.iter().cloned())
            .collect();

        Self {
            run_id,
            records_emitted,
            sources,
            soft_failures,
            started_at,
            finished_at,
        }
    }

    /// Returns true if any URL was skipped.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.soft_failures.is_empty()
    }

    /// Soft failures of one source.
    #[must_use]
    pub fn failures_for(&self, source: SourceId) -> Vec<&SoftFailure> {
        self.soft_failures
            .iter()
            .filter(|f| f.source == source)
            .collect()
    }

    /// Report of one source, if it was enabled.
    #[must_use]
    pub fn report(&self, source: SourceId) -> Option<&SourceReport> {
        self.sources.get(&source)
    }

    /// Converts to dictionary.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("run_id".to_string(), serde_json::json!(self.run_id.to_string()));
        map.insert("records_emitted".to_string(), serde_json::json!(self.records_emitted));
        map.insert(
            "duration_ms".to_string(),
            serde_json::json!((self.finished_at - self.started_at).num_milliseconds()),
        );
        map.insert(
            "sources".to_string(),
            serde_json::json!(self
                .sources
                .values()
                .map(|r| {
                    serde_json::json!({
                        "source": r.source,
                        "pages_fetched": r.pages_fetched,
                        "records_produced": r.records_produced,
                        "records_delivered": r.records_delivered,
                        "duplicates_skipped": r.duplicates_skipped,
                        "termination": r.termination,
                        "failures": r.failures.len(),
                    })
                })
                .collect::<Vec<_>>()),
        );
        map.insert(
            "soft_failures".to_string(),
            serde_json::json!(self
                .soft_failures
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "source": f.source,
                        "url": f.url,
                        "kind": f.kind,
                        "reason": f.reason,
                    })
                })
                .collect::<Vec<_>>()),
        );
        map
    }
}
