//! # Jobsniffer
//!
//! A paginated, two-stage crawler for job listing sites.
//!
//! For each enabled source the crawler walks search-result pages, extracts
//! a partial record per job card, follows each card's link to the detail
//! page and completes the record there. It provides:
//!
//! - **Declarative source profiles**: CSS selectors, URL templates and
//!   pagination policy per site, validated before anything is fetched
//! - **Bounded crawling**: a page limit per source, detail pages fetched
//!   concurrently, each fetch bounded by a timeout and retried with backoff
//! - **Soft failures**: an unreachable or malformed page is skipped and
//!   recorded without stopping the crawl
//! - **Cancellation**: a run can be cancelled at any time, abandoning
//!   in-flight fetches
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jobsniffer::prelude::*;
//!
//! let crawler = Crawler::builder().build()?;
//! let request = CrawlRequest::new("data analyst", "paris")
//!     .with_max_pages(3)
//!     .with_source(SourceId::HelloWork);
//!
//! let (records, summary) = crawler.start(request)?.collect().await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod core;
pub mod crawler;
pub mod document;
pub mod errors;
pub mod events;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod pagination;
pub mod sources;
pub mod stages;
pub mod testing;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{CrawlRequest, CrawlerConfig, FetchConfig};
    pub use crate::core::{CompleteRecord, DetailFields, PartialRecord, SourceId};
    pub use crate::crawler::{CrawlRun, CrawlSummary, Crawler, CrawlerBuilder, SoftFailure};
    pub use crate::errors::{ConfigurationError, CrawlError, FetchError, ParseError};
    pub use crate::events::{CrawlEvent, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::fetch::{FetchedPage, Fetcher, RenderMode, RetryConfig};
    pub use crate::output::RecordSink;
    pub use crate::pagination::{PaginationPolicy, TerminationReason};
    pub use crate::sources::{SourceProfile, SourceRegistry};
}
