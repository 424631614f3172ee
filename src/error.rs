//! Error types for hostnet-dns.

use std::time::Duration;
use thiserror::Error;

/// Errors reported by an object cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backing store could not serve the request.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// The caller cancelled the request.
    #[error("cache request cancelled")]
    Cancelled,
}

/// Errors that can occur while building or running the source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Listing workloads failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Caches did not finish their initial sync in time.
    #[error("caches not synced after {0:?}")]
    CacheSyncTimeout(Duration),

    /// IO error (snapshot file, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot document could not be decoded.
    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
