//! Crawl orchestration: one task per source, merged into one record stream.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::pipeline::{PipelineContext, SourcePipeline};
use super::summary::{CrawlSummary, SoftFailure, SourceReport};
use super::CrawlerBuilder;
use crate::cancellation::CancellationToken;
use crate::config::{CrawlRequest, CrawlerConfig};
use crate::core::{CompleteRecord, SourceId};
use crate::errors::{ConfigurationError, CrawlError};
use crate::events::EventSink;
use crate::fetch::Fetcher;
use crate::output::RecordSink;
use crate::pagination::TerminationReason;
use crate::sources::SourceRegistry;

/// The crawl engine.
///
/// Holds the validated configuration, the compiled source profiles and the
/// shared fetcher. One crawler can start any number of runs.
pub struct Crawler {
    config: CrawlerConfig,
    registry: SourceRegistry,
    fetcher: Arc<dyn Fetcher>,
    events: Arc<dyn EventSink>,
}

impl Crawler {
    pub(crate) fn new(
        config: CrawlerConfig,
        registry: SourceRegistry,
        fetcher: Arc<dyn Fetcher>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            registry,
            fetcher,
            events,
        }
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> CrawlerBuilder {
        CrawlerBuilder::new()
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Compiled source profiles.
    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Validates `request` and spawns one pipeline per enabled source.
    ///
    /// Nothing is fetched when validation fails. Must be called from within
    /// a tokio runtime.
    pub fn start(&self, request: CrawlRequest) -> Result<CrawlRun, ConfigurationError> {
        request.validate()?;

        let mut plans = Vec::with_capacity(request.sources.len());
        for id in &request.sources {
            let source = self.registry.get(*id)?.clone();
            let first_url = source
                .first_page_url(&request.job_title, &request.location)
                .map_err(|e| e.with_field(format!("sources.{id}.search_url")))?;
            plans.push((source, first_url));
        }

        let run_id = Uuid::now_v7();
        let cancel = CancellationToken::new();
        let (sender, receiver) = mpsc::channel(self.config.channel_capacity.max(1));
        let ctx = PipelineContext {
            request: Arc::new(request),
            fetcher: Arc::clone(&self.fetcher),
            events: Arc::clone(&self.events),
            cancel: cancel.clone(),
            retry: self.config.retry.clone(),
            timeout: self.config.fetch.timeout(),
            detail_concurrency: self.config.detail_concurrency,
        };

        tracing::info!(
            run_id = %run_id,
            sources = plans.len(),
            max_pages = ctx.request.max_pages,
            "Crawl started"
        );

        let tasks = plans
            .into_iter()
            .map(|(source, first_url)| {
                let id = source.id();
                let pipeline = SourcePipeline::new(source, first_url, ctx.clone(), sender.clone());
                (id, tokio::spawn(pipeline.run()))
            })
            .collect();

        Ok(CrawlRun {
            run_id,
            started_at: Utc::now(),
            cancel,
            receiver,
            exhausted: false,
            tasks,
            seen: HashSet::new(),
            delivered: BTreeMap::new(),
        })
    }

    /// Runs a crawl to completion, handing every record to `sink`.
    pub async fn crawl(
        &self,
        request: CrawlRequest,
        sink: &dyn RecordSink,
    ) -> Result<CrawlSummary, CrawlError> {
        self.start(request)?.drain_into(sink).await
    }
}

impl std::fmt::Debug for Crawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("config", &self.config)
            .field("sources", &self.registry.ids().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// A running crawl.
///
/// Records arrive one at a time through [`next_record`](Self::next_record);
/// each canonical URL is delivered at most once per run. Dropping the run
/// cancels it.
pub struct CrawlRun {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    cancel: CancellationToken,
    receiver: mpsc::Receiver<CompleteRecord>,
    exhausted: bool,
    tasks: Vec<(SourceId, JoinHandle<SourceReport>)>,
    seen: HashSet<String>,
    delivered: BTreeMap<SourceId, usize>,
}

impl CrawlRun {
    /// Run identifier.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// A handle that cancels this run.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancels the run. In-flight fetches are abandoned.
    pub fn cancel(&self, reason: impl Into<String>) {
        self.cancel.cancel(reason);
    }

    /// Next record, or `None` once every source has finished.
    pub async fn next_record(&mut self) -> Option<CompleteRecord> {
        loop {
            let Some(record) = self.receiver.recv().await else {
                self.exhausted = true;
                return None;
            };
            if self.seen.insert(record.fingerprint().to_string()) {
                *self.delivered.entry(record.source()).or_default() += 1;
                return Some(record);
            }
            tracing::debug!(
                source = %record.source(),
                url = %record.canonical_url(),
                "Dropping duplicate record"
            );
        }
    }

    /// Waits for every source and returns the summary.
    ///
    /// Finishing before all records were consumed cancels the run.
    pub async fn finish(mut self) -> CrawlSummary {
        if !self.exhausted {
            self.cancel.cancel("crawl finished before all records were consumed");
        }
        self.receiver.close();

        let mut reports = Vec::with_capacity(self.tasks.len());
        for (id, task) in std::mem::take(&mut self.tasks) {
            let mut report = match task.await {
                Ok(report) => report,
                Err(error) => {
                    tracing::error!(source = %id, error = %error, "Source task aborted");
                    let mut report = SourceReport::new(id, TerminationReason::Aborted);
                    report.failures.push(SoftFailure::new(id, "", "aborted", error.to_string()));
                    report
                }
            };
            report.records_delivered = self.delivered.get(&id).copied().unwrap_or(0);
            reports.push(report);
        }

        let summary = CrawlSummary::new(self.run_id, reports, self.started_at, Utc::now());
        tracing::info!(
            run_id = %summary.run_id,
            records = summary.records_emitted,
            failures = summary.soft_failures.len(),
            "Crawl finished"
        );
        summary
    }

    /// Hands every record to `sink`, then flushes it and returns the summary.
    ///
    /// A sink error cancels the run.
    pub async fn drain_into(mut self, sink: &dyn RecordSink) -> Result<CrawlSummary, CrawlError> {
        while let Some(record) = self.next_record().await {
            if let Err(error) = sink.accept(&record).await {
                tracing::error!(error = %error, "Record sink failed; cancelling crawl");
                self.cancel("record sink failed");
                self.finish().await;
                return Err(error);
            }
        }
        sink.flush().await?;
        Ok(self.finish().await)
    }

    /// Collects every record in memory.
    pub async fn collect(mut self) -> (Vec<CompleteRecord>, CrawlSummary) {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await {
            records.push(record);
        }
        (records, self.finish().await)
    }
}

impl Drop for CrawlRun {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            self.cancel.cancel("crawl run dropped");
        }
    }
}

impl std::fmt::Debug for CrawlRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlRun")
            .field("run_id", &self.run_id)
            .field("cancel", &self.cancel)
            .field("sources", &self.tasks.iter().map(|(id, _)| *id).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
