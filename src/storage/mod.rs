//! Storage module for the crawl frontier
//!
//! This module holds the pending-page queue behind a swappable backend:
//! - An in-memory FIFO for one-shot crawls
//! - An append-only log file that survives restarts and supports resumption
//! - The line format of that log

mod log_file;
mod memory;
mod record;
mod traits;

pub use log_file::LogFileStorage;
pub use memory::MemoryStorage;
pub use record::{LogLineError, LogRecord};
pub use traits::{FrontierStorage, StorageError, StorageResult};

use url::Url;

/// A page awaiting a fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Absolute, canonical URL of the page
    pub url: Url,

    /// Link distance from the seed (the seed is depth 1)
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }
}
