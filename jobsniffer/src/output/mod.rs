//! Record sinks.
//!
//! A [`RecordSink`] receives complete records as they are scraped, one at a
//! time, in delivery order. Persistence collaborators implement it.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::CompleteRecord;
use crate::errors::CrawlError;

/// Receives records as they are scraped.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Accepts one record.
    async fn accept(&self, record: &CompleteRecord) -> Result<(), CrawlError>;

    /// Flushes buffered output. Called once after the last record.
    async fn flush(&self) -> Result<(), CrawlError> {
        Ok(())
    }
}

/// A sink that keeps every record in memory.
#[derive(Debug, Default)]
pub struct CollectingRecordSink {
    records: Mutex<Vec<CompleteRecord>>,
}

impl CollectingRecordSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records received so far.
    #[must_use]
    pub fn records(&self) -> Vec<CompleteRecord> {
        self.records.lock().clone()
    }

    /// Number of records received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing was received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl RecordSink for CollectingRecordSink {
    async fn accept(&self, record: &CompleteRecord) -> Result<(), CrawlError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
