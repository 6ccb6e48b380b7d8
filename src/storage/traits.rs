//! Storage traits and error types
//!
//! This module defines the capability interface for frontier storage
//! backends and associated error types.

use crate::storage::FrontierEntry;
use thiserror::Error;
use url::Url;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage is closed")]
    Closed,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for frontier storage implementations
///
/// A storage backend records pages waiting to be crawled and hands them back
/// one at a time. Backends are selected when the session is built: the
/// volatile [`MemoryStorage`](crate::storage::MemoryStorage) or the resumable
/// [`LogFileStorage`](crate::storage::LogFileStorage).
pub trait FrontierStorage {
    /// Records a page for later crawling
    ///
    /// # Arguments
    ///
    /// * `url` - The canonical, absolute URL
    /// * `depth` - Link distance from the seed (the seed is depth 1)
    fn add(&mut self, url: &Url, depth: u32) -> StorageResult<()>;

    /// Removes and returns the next pending page
    ///
    /// Returns `Ok(None)` when the queue is exhausted.
    fn next(&mut self) -> StorageResult<Option<FrontierEntry>>;

    /// Releases any held resources
    ///
    /// Calling `close` more than once is allowed and has no further effect.
    fn close(&mut self) -> StorageResult<()>;

    /// Returns every URL this storage already knows about
    ///
    /// Used to seed the frontier's duplicate check when resuming. Volatile
    /// storage starts empty and keeps the default.
    fn known_urls(&self) -> Vec<String> {
        Vec::new()
    }
}
