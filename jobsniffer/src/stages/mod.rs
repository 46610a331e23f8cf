//! Crawl stages.
//!
//! Stages are synchronous and pure: they take a fetched page (or a parsed
//! document) and return typed records. Fetching, concurrency and
//! cancellation live in the crawler.

mod detail;
mod listing;

pub use detail::DetailStage;
pub use listing::{ListingEntry, ListingPage, ListingStage};
