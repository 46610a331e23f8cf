//! Event sink trait and implementations.

use async_trait::async_trait;
use tracing::{debug, info, warn, Level};

use super::CrawlEvent;

/// Trait for sinks that receive crawl events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Emits an event asynchronously.
    async fn emit(&self, event: &CrawlEvent);

    /// Emits an event without blocking.
    ///
    /// Must never fail or panic; sinks that can fail log and drop the event.
    fn try_emit(&self, event: &CrawlEvent);
}

/// A no-op event sink that discards all events.
///
/// Used as the default when no sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: &CrawlEvent) {}

    fn try_emit(&self, _event: &CrawlEvent) {}
}

/// An event sink that logs events using the tracing framework.
///
/// Soft failures are always logged at `WARN`.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingEventSink {
    /// Creates a new logging event sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging sink.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }

    fn log_event(&self, event: &CrawlEvent) {
        let event_type = event.event_type();
        let source = event.source();
        let data = event.to_json();

        if let CrawlEvent::SoftFailure(failure) = event {
            warn!(
                event_type,
                %source,
                url = %failure.url,
                kind = %failure.kind,
                "{}", failure.reason
            );
            return;
        }

        match self.level {
            Level::TRACE | Level::DEBUG => {
                debug!(event_type, %source, event_data = %data, "Event: {}", event_type);
            }
            _ => {
                info!(event_type, %source, event_data = %data, "Event: {}", event_type);
            }
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event: &CrawlEvent) {
        self.log_event(event);
    }

    fn try_emit(&self, event: &CrawlEvent) {
        self.log_event(event);
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: parking_lot::RwLock<Vec<CrawlEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events of one dotted type, e.g. `crawl.page_fetched`.
    #[must_use]
    pub fn events_of_type(&self, event_type: &str) -> Vec<CrawlEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event: &CrawlEvent) {
        self.events.write().push(event.clone());
    }

    fn try_emit(&self, event: &CrawlEvent) {
        self.events.write().push(event.clone());
    }
}
