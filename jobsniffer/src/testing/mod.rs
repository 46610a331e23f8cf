//! Testing utilities for jobsniffer crawls.
//!
//! This module provides:
//! - A canned, call-recording [`Fetcher`](crate::fetch::Fetcher)
//! - HTML builders shaped like the built-in sources' pages

mod fixtures;
mod mocks;

pub use fixtures::{hellowork_listing, wttj_listing, DetailPage, ListingCard};
pub use mocks::StaticFetcher;
