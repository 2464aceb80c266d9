//! Infrastructure layer for storage and I/O.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - In-memory rule store with JSON snapshot files
//! - [`access_log`] - Buffered, periodically flushed access log writer

pub mod access_log;
pub mod persistence;
