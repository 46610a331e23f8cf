//! Core domain model types for jobsniffer.
//!
//! This module contains the records that flow through the crawl engine:
//! - Partial records built from listing pages
//! - Complete records merged with detail-page fields
//! - Source identifiers

mod record;
mod source;

pub use record::{fingerprint_url, CompleteRecord, DetailFields, PartialRecord};
pub use source::SourceId;
