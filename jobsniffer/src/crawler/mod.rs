//! Crawl engine.
//!
//! This module provides:
//! - [`Crawler`] and its [`CrawlerBuilder`]
//! - [`CrawlRun`], the merged record stream of one crawl
//! - Soft-failure bookkeeping and the final [`CrawlSummary`]
//!
//! Each enabled source runs as its own task: listing pages are fetched in
//! sequence, detail pages of one listing page concurrently. Records from all
//! sources are merged into one stream and de-duplicated by canonical URL.

mod builder;
mod orchestrator;
mod pipeline;
mod summary;

#[cfg(test)]
mod integration_tests;

pub use builder::CrawlerBuilder;
pub use orchestrator::{CrawlRun, Crawler};
pub use summary::{CrawlSummary, FailureCollector, SoftFailure, SourceReport};
