//! Crawl events and the sinks that receive them.
//!
//! Source pipelines report progress as typed [`CrawlEvent`]s through an
//! [`EventSink`]. Sinks are passed explicitly to the crawler; there is no
//! global sink.

mod event;
mod sink;

pub use event::CrawlEvent;
pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
