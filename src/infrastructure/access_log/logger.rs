//! Access logger handle and its background worker.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWrite;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

use super::{LogBuffer, LogError};
use crate::domain::entities::AccessLogEntry;

/// Tunables of the access logger.
#[derive(Debug, Clone, Copy)]
pub struct AccessLogSettings {
    /// Entries buffered before a flush is forced.
    pub buffer_size: usize,
    /// Period of the background flush.
    pub flush_interval: Duration,
    /// Bound of the hand-off queue between request handlers and the worker.
    pub queue_capacity: usize,
}

impl Default for AccessLogSettings {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            flush_interval: Duration::from_secs(180),
            queue_capacity: 10_000,
        }
    }
}

enum LogCommand {
    Entry(AccessLogEntry),
    Flush(oneshot::Sender<Result<usize, LogError>>),
    Close,
}

/// Cloneable handle to the access log worker.
///
/// [`AccessLogger::log`] never blocks: entries go through a bounded queue and
/// are dropped (newest first) when the queue is full or the logger is closed.
/// The single worker owns the [`LogBuffer`], so buffer mutation and flushing
/// never interleave and entries reach the file in queue order.
#[derive(Clone)]
pub struct AccessLogger {
    tx: mpsc::Sender<LogCommand>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl AccessLogger {
    /// Opens `path` for appending and starts the worker.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Open`] if the file cannot be opened or created.
    pub async fn open(path: &Path, settings: AccessLogSettings) -> Result<Self, LogError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|source| LogError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::spawn(file, settings))
    }

    /// Starts a worker writing to an arbitrary sink.
    pub fn spawn<W>(sink: W, settings: AccessLogSettings) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
        let buffer = LogBuffer::new(sink, settings.buffer_size);
        // `interval_at` panics on a zero period.
        let flush_interval = settings.flush_interval.max(Duration::from_millis(1));
        let handle = tokio::spawn(run_access_log_worker(rx, buffer, flush_interval));

        Self {
            tx,
            worker: Arc::new(Mutex::new(Some(handle))),
        }
    }

    /// Queues an entry without waiting.
    ///
    /// Returns `false` if the entry was dropped.
    pub fn log(&self, entry: AccessLogEntry) -> bool {
        match self.tx.try_send(LogCommand::Entry(entry)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                metrics::counter!("jumpgate_access_log_dropped_total").increment(1);
                warn!("Access log queue full, dropping entry");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Access logger closed, dropping entry");
                false
            }
        }
    }

    /// Writes everything queued so far and waits for the write to finish.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Closed`] after [`AccessLogger::close`], or the
    /// worker's write error.
    pub async fn flush(&self) -> Result<usize, LogError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(LogCommand::Flush(ack))
            .await
            .map_err(|_| LogError::Closed)?;
        done.await.map_err(|_| LogError::Closed)?
    }

    /// Stops the worker after a final flush and closes the file.
    ///
    /// Entries queued before this call are written. Only the first call does
    /// anything; later calls return [`LogError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Closed`] if the logger was already closed.
    pub async fn close(&self) -> Result<(), LogError> {
        let handle = self.worker.lock().await.take().ok_or(LogError::Closed)?;

        // The worker may already be gone if it panicked; joining reports that.
        let _ = self.tx.send(LogCommand::Close).await;
        if let Err(e) = handle.await {
            error!(error = %e, "Access log worker terminated abnormally");
        }
        Ok(())
    }

    /// Returns true once the worker has stopped accepting entries.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Free slots in the hand-off queue, not its configured bound.
    pub fn free_queue_slots(&self) -> usize {
        self.tx.capacity()
    }
}

/// Drains the command queue into `buffer`, flushing on capacity, on every
/// `flush_interval` tick, on request, and once more before exiting.
///
/// Exits on [`LogCommand::Close`] or when every sender is dropped.
async fn run_access_log_worker<W>(
    mut rx: mpsc::Receiver<LogCommand>,
    mut buffer: LogBuffer<W>,
    flush_interval: Duration,
) where
    W: AsyncWrite + Unpin,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + flush_interval, flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(LogCommand::Entry(entry)) => match buffer.push(entry).await {
                    Ok(true) => debug!("Access log buffer full, flushed"),
                    Ok(false) => {}
                    Err(e) => error!(error = %e, "Access log flush failed"),
                },
                Some(LogCommand::Flush(ack)) => {
                    let result = flush_logged(&mut buffer).await;
                    let _ = ack.send(result);
                }
                Some(LogCommand::Close) | None => break,
            },
            _ = ticker.tick() => {
                let _ = flush_logged(&mut buffer).await;
            }
        }
    }

    rx.close();
    match buffer.close().await {
        Ok(written) => debug!(written, "Access logger closed"),
        Err(e) => error!(error = %e, "Final access log flush failed"),
    }
}

async fn flush_logged<W: AsyncWrite + Unpin>(
    buffer: &mut LogBuffer<W>,
) -> Result<usize, LogError> {
    let result = buffer.flush().await;
    match &result {
        Ok(written) if *written > 0 => {
            metrics::counter!("jumpgate_access_log_written_total").increment(*written as u64);
        }
        Ok(_) => {}
        Err(e) => error!(error = %e, "Access log flush failed"),
    }
    result
}
