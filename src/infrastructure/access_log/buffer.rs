//! Capacity-bounded buffer of access log entries in front of an async sink.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::error;

use super::LogError;
use crate::domain::entities::AccessLogEntry;

/// Buffers entries and writes them as newline-delimited JSON.
///
/// Nothing reaches the sink until [`LogBuffer::flush`] runs, either explicitly
/// or because [`LogBuffer::push`] filled the buffer. Entries are written in
/// the order they were pushed.
pub struct LogBuffer<W> {
    entries: Vec<AccessLogEntry>,
    capacity: usize,
    sink: W,
}

impl<W: AsyncWrite + Unpin> LogBuffer<W> {
    /// Creates a buffer flushing to `sink` every `capacity` entries.
    ///
    /// A zero capacity is treated as one.
    pub fn new(sink: W, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            sink,
        }
    }

    /// Appends an entry, flushing when the buffer reaches capacity.
    ///
    /// Returns `Ok(true)` if this call flushed the buffer.
    ///
    /// # Errors
    ///
    /// Propagates the [`LogError`] of the triggered flush.
    pub async fn push(&mut self, entry: AccessLogEntry) -> Result<bool, LogError> {
        self.entries.push(entry);
        if self.entries.len() < self.capacity {
            return Ok(false);
        }
        self.flush().await.map(|_| true)
    }

    /// Writes all buffered entries to the sink and clears the buffer.
    ///
    /// An entry that fails to serialize is reported and skipped. Returns the
    /// number of entries written.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Write`] if the sink rejects the batch; the batch is
    /// dropped in that case.
    pub async fn flush(&mut self) -> Result<usize, LogError> {
        if self.entries.is_empty() {
            return Ok(0);
        }

        let mut batch = Vec::new();
        let mut written = 0;
        for entry in self.entries.drain(..) {
            match serde_json::to_vec(&entry) {
                Ok(line) => {
                    batch.extend_from_slice(&line);
                    batch.push(b'\n');
                    written += 1;
                }
                Err(e) => error!(error = %e, "Failed to serialize access log entry"),
            }
        }

        self.sink.write_all(&batch).await.map_err(LogError::Write)?;
        self.sink.flush().await.map_err(LogError::Write)?;

        Ok(written)
    }

    /// Flushes remaining entries and shuts the sink down.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Write`] if the final flush or the shutdown fails.
    pub async fn close(mut self) -> Result<usize, LogError> {
        let written = self.flush().await?;
        self.sink.shutdown().await.map_err(LogError::Write)?;
        Ok(written)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::RedirectKind;
    use chrono::Utc;

    fn entry(path: &str) -> AccessLogEntry {
        AccessLogEntry {
            timestamp: Utc::now(),
            ip: "10.0.0.1".to_string(),
            user_agent: "TestBot/1.0".to_string(),
            method: "GET".to_string(),
            domain: "a.com".to_string(),
            path: path.to_string(),
            target: "https://b.com".to_string(),
            redirect_type: RedirectKind::Permanent,
            status_code: 301,
        }
    }

    fn lines(sink: &[u8]) -> Vec<AccessLogEntry> {
        std::str::from_utf8(sink)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_below_capacity_writes_nothing() {
        let mut buffer = LogBuffer::new(Vec::new(), 5);

        for i in 0..4 {
            assert!(!buffer.push(entry(&format!("/{i}"))).await.unwrap());
        }

        assert_eq!(buffer.len(), 4);
        assert!(buffer.sink().is_empty());
    }

    #[tokio::test]
    async fn test_reaching_capacity_flushes_once() {
        let mut buffer = LogBuffer::new(Vec::new(), 3);

        let flushed: Vec<bool> = [
            buffer.push(entry("/a")).await.unwrap(),
            buffer.push(entry("/b")).await.unwrap(),
            buffer.push(entry("/c")).await.unwrap(),
        ]
        .to_vec();

        assert_eq!(flushed, vec![false, false, true]);
        assert!(buffer.is_empty());

        let written = lines(buffer.sink());
        let paths: Vec<_> = written.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/b", "/c"]);
    }

    #[tokio::test]
    async fn test_explicit_flush_preserves_order() {
        let mut buffer = LogBuffer::new(Vec::new(), 100);
        let entries: Vec<_> = (0..10).map(|i| entry(&format!("/{i}"))).collect();

        for e in entries.clone() {
            buffer.push(e).await.unwrap();
        }
        assert_eq!(buffer.flush().await.unwrap(), 10);
        assert_eq!(buffer.flush().await.unwrap(), 0);

        assert_eq!(lines(buffer.sink()), entries);
    }

    #[tokio::test]
    async fn test_zero_capacity_flushes_every_entry() {
        let mut buffer = LogBuffer::new(Vec::new(), 0);

        assert_eq!(buffer.capacity(), 1);
        assert!(buffer.push(entry("/a")).await.unwrap());
    }

    #[tokio::test]
    async fn test_close_flushes_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        let file = tokio::fs::File::create(&path).await.unwrap();

        let mut buffer = LogBuffer::new(file, 10);
        buffer.push(entry("/a")).await.unwrap();
        buffer.push(entry("/b")).await.unwrap();
        assert_eq!(buffer.close().await.unwrap(), 2);

        let content = std::fs::read(&path).unwrap();
        assert_eq!(lines(&content).len(), 2);
    }
}
