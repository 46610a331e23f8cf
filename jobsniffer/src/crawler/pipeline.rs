//! One source's crawl: listing pages in sequence, detail pages concurrently.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

use super::summary::{FailureCollector, SoftFailure, SourceReport};
use crate::cancellation::CancellationToken;
use crate::config::CrawlRequest;
use crate::core::CompleteRecord;
use crate::errors::FetchError;
use crate::events::{CrawlEvent, EventSink};
use crate::fetch::{fetch_with_retry, FetchedPage, Fetcher, RetryConfig};
use crate::pagination::{PageOutcome, PaginationController, TerminationReason};
use crate::sources::CompiledSource;
use crate::stages::ListingEntry;

/// Outcome of a fetch raced against cancellation.
enum Fetched {
    Page(FetchedPage),
    Failed(FetchError),
    Abandoned,
}

/// Shared, read-only pieces every source pipeline uses.
#[derive(Clone)]
pub(crate) struct PipelineContext {
    pub(crate) request: Arc<CrawlRequest>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) events: Arc<dyn EventSink>,
    pub(crate) cancel: CancellationToken,
    pub(crate) retry: RetryConfig,
    pub(crate) timeout: Duration,
    pub(crate) detail_concurrency: usize,
}

/// Crawls one source and sends its records to the merge channel.
pub(crate) struct SourcePipeline {
    source: CompiledSource,
    first_url: Url,
    ctx: PipelineContext,
    records: mpsc::Sender<CompleteRecord>,
}

impl SourcePipeline {
    pub(crate) fn new(
        source: CompiledSource,
        first_url: Url,
        ctx: PipelineContext,
        records: mpsc::Sender<CompleteRecord>,
    ) -> Self {
        Self {
            source,
            first_url,
            ctx,
            records,
        }
    }

    /// Runs until pagination reaches a terminal state.
    pub(crate) async fn run(self) -> SourceReport {
        let id = self.source.id();
        let request = Arc::clone(&self.ctx.request);
        let mut report = SourceReport::new(id, TerminationReason::MaxPagesReached);
        let mut failures = FailureCollector::new();
        let mut visited: HashSet<Url> = HashSet::new();
        let mut controller = PaginationController::new(
            self.source.pagination(),
            request.max_pages,
            self.first_url.clone(),
        );

        self.ctx.events.try_emit(&CrawlEvent::SourceStarted {
            source: id,
            url: self.first_url.to_string(),
            max_pages: request.max_pages,
        });
        tracing::info!(source = %id, url = %self.first_url, "Source crawl started");

        'pages: while let Some((page, url)) = controller.current().map(|(p, u)| (p, u.clone())) {
            let fetched = match self.fetch(&url).await {
                Fetched::Page(fetched) => fetched,
                Fetched::Failed(error) => {
                    tracing::warn!(source = %id, url = %url, page, error = %error, "Listing fetch failed");
                    self.fail(&mut failures, SoftFailure::fetch(id, url.as_str(), &error));
                    controller.terminate(TerminationReason::ListingFetchFailed);
                    break;
                }
                Fetched::Abandoned => {
                    controller.terminate(TerminationReason::Cancelled);
                    break;
                }
            };

            let listing = match self.source.listing().parse_page(&fetched) {
                Ok(listing) => listing,
                Err(error) => {
                    tracing::warn!(source = %id, url = %url, page, error = %error, "Listing page unusable");
                    self.fail(&mut failures, SoftFailure::parse(id, url.as_str(), &error));
                    controller.terminate(TerminationReason::ListingFetchFailed);
                    break;
                }
            };

            report.pages_fetched += 1;
            self.ctx.events.try_emit(&CrawlEvent::PageFetched {
                source: id,
                page,
                url: url.to_string(),
                items_found: listing.items_found,
                dropped: listing.dropped,
            });
            tracing::debug!(
                source = %id,
                page,
                items = listing.items_found,
                dropped = listing.dropped,
                "Listing page parsed"
            );

            let outcome = PageOutcome {
                items_found: listing.items_found,
                next_page: listing.next_page,
            };

            let mut entries = Vec::with_capacity(listing.entries.len());
            for entry in listing.entries {
                if visited.insert(entry.detail_url.clone()) {
                    entries.push(entry);
                } else {
                    report.duplicates_skipped += 1;
                    tracing::debug!(source = %id, url = %entry.detail_url, "Skipping already listed offer");
                }
            }

            let Some(records) = self.fetch_details(entries, &mut failures).await else {
                controller.terminate(TerminationReason::Cancelled);
                break;
            };

            for record in records {
                let emitted = CrawlEvent::RecordEmitted {
                    source: id,
                    url: record.canonical_url().to_string(),
                    fingerprint: record.fingerprint().to_string(),
                };
                let delivered = tokio::select! {
                    biased;
                    () = self.ctx.cancel.cancelled() => false,
                    sent = self.records.send(record) => sent.is_ok(),
                };
                if !delivered {
                    controller.terminate(TerminationReason::Cancelled);
                    break 'pages;
                }
                report.records_produced += 1;
                self.ctx.events.try_emit(&emitted);
            }

            controller.advance(outcome, |next| {
                self.source
                    .page_url(&request.job_title, &request.location, next)
            });
        }

        report.termination = controller
            .termination()
            .unwrap_or(TerminationReason::Aborted);
        report.failures = failures.into_failures();

        self.ctx.events.try_emit(&CrawlEvent::SourceFinished {
            source: id,
            pages_fetched: report.pages_fetched,
            records_produced: report.records_produced,
            termination: report.termination,
        });
        tracing::info!(
            source = %id,
            pages = report.pages_fetched,
            records = report.records_produced,
            failures = report.failures.len(),
            termination = %report.termination,
            "Source crawl finished"
        );

        report
    }

    /// Fetches every detail page of one listing page, at most
    /// `detail_concurrency` at a time, and returns the records in listing order.
    ///
    /// Returns `None` if the crawl was cancelled meanwhile.
    async fn fetch_details(
        &self,
        entries: Vec<ListingEntry>,
        failures: &mut FailureCollector,
    ) -> Option<Vec<CompleteRecord>> {
        let id = self.source.id();

        let mut fetched: Vec<(usize, ListingEntry, Fetched)> = stream::iter(entries.into_iter().enumerate())
            .map(|(index, entry)| async move {
                let outcome = self.fetch(&entry.detail_url).await;
                (index, entry, outcome)
            })
            .buffer_unordered(self.ctx.detail_concurrency.max(1))
            .collect()
            .await;

        if self.ctx.cancel.is_cancelled() {
            return None;
        }

        fetched.sort_by_key(|(index, _, _)| *index);

        let scraped_at = Utc::now();
        let mut records = Vec::with_capacity(fetched.len());
        for (_, entry, outcome) in fetched {
            let url = entry.detail_url;
            match outcome {
                Fetched::Page(page) => {
                    match self.source.detail().complete_page(entry.record, &page, id, scraped_at) {
                        Ok(record) => records.push(record),
                        Err(error) => {
                            tracing::warn!(source = %id, url = %url, error = %error, "Detail page unusable");
                            self.fail(failures, SoftFailure::parse(id, url.as_str(), &error));
                        }
                    }
                }
                Fetched::Failed(error) => {
                    tracing::warn!(source = %id, url = %url, error = %error, "Detail fetch failed");
                    self.fail(failures, SoftFailure::fetch(id, url.as_str(), &error));
                }
                Fetched::Abandoned => return None,
            }
        }
        Some(records)
    }

    /// Fetches `url` with retries, racing the whole call against cancellation.
    async fn fetch(&self, url: &Url) -> Fetched {
        if self.ctx.cancel.is_cancelled() {
            return Fetched::Abandoned;
        }

        let fetch = fetch_with_retry(
            self.ctx.fetcher.as_ref(),
            url,
            self.source.render_mode(),
            self.ctx.timeout,
            &self.ctx.retry,
        );

        tokio::select! {
            biased;
            () = self.ctx.cancel.cancelled() => Fetched::Abandoned,
            result = fetch => match result {
                Ok(page) => Fetched::Page(page),
                Err(error) => Fetched::Failed(error),
            },
        }
    }

    fn fail(&self, failures: &mut FailureCollector, failure: SoftFailure) {
        self.ctx.events.try_emit(&CrawlEvent::SoftFailure(failure.clone()));
        failures.record(failure);
    }
}
