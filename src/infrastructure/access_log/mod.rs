//! Buffered access log.
//!
//! Request handlers hand [`AccessLogEntry`](crate::domain::entities::AccessLogEntry)
//! values to an [`AccessLogger`]. A single background worker owns a
//! [`LogBuffer`] and appends entries to the log file as newline-delimited
//! JSON when the buffer fills, on a fixed timer, on request, and on close.
//!
//! Failures stay inside this module and are reported through `tracing`; the
//! request path never sees them.

mod buffer;
mod logger;

use std::path::PathBuf;

pub use buffer::LogBuffer;
pub use logger::{AccessLogSettings, AccessLogger};

/// Access log failure.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to open access log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write access log: {0}")]
    Write(#[source] std::io::Error),

    #[error("access logger is closed")]
    Closed,
}
