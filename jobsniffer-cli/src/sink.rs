//! JSON-lines record output.

use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

use jobsniffer::core::CompleteRecord;
use jobsniffer::errors::CrawlError;
use jobsniffer::output::RecordSink;

type Writer = BufWriter<Box<dyn AsyncWrite + Send + Unpin>>;

/// Writes one JSON object per record, one record per line.
pub struct JsonLinesSink {
    writer: Mutex<Writer>,
}

impl JsonLinesSink {
    /// Writes to standard output.
    pub fn stdout() -> Self {
        Self::new(Box::new(tokio::io::stdout()))
    }

    /// Creates (or truncates) `path` and writes to it.
    pub async fn create(path: &Path) -> Result<Self, CrawlError> {
        let file = tokio::fs::File::create(path).await?;
        Ok(Self::new(Box::new(file)))
    }

    fn new(inner: Box<dyn AsyncWrite + Send + Unpin>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(inner)),
        }
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn accept(&self, record: &CompleteRecord) -> Result<(), CrawlError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.writer
            .lock()
            .await
            .write_all(&line)
            .await
            .map_err(|e| CrawlError::Sink(e.to_string()))
    }

    async fn flush(&self) -> Result<(), CrawlError> {
        self.writer
            .lock()
            .await
            .flush()
            .await
            .map_err(|e| CrawlError::Sink(e.to_string()))
    }
}
