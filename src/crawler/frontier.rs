//! The crawl frontier
//!
//! The frontier wraps a [`FrontierStorage`] backend. It canonicalizes every
//! URL before storing it and suppresses URLs it has already enqueued, so the
//! storage only ever sees each canonical URL once per session.

use crate::storage::{
    FrontierEntry, FrontierStorage, LogFileStorage, MemoryStorage, StorageResult,
};
use crate::url::{canonical_url, parse_canonical};
use crate::WebcpError;
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Outcome of adding a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The URL was new and has been stored
    Queued,

    /// The canonical URL was already enqueued earlier
    Duplicate,
}

/// Deduplicating queue of pages to crawl
pub struct Frontier {
    storage: Box<dyn FrontierStorage + Send>,

    /// Canonical URLs enqueued so far, including those already crawled
    seen: HashSet<String>,

    /// Whether the storage was positioned mid-log on open
    did_resume: bool,
}

impl Frontier {
    /// Creates a frontier over volatile in-memory storage
    pub fn new() -> Self {
        Self::with_storage(Box::new(MemoryStorage::new()))
    }

    /// Creates a frontier over the given storage backend
    pub fn with_storage(storage: Box<dyn FrontierStorage + Send>) -> Self {
        let mut frontier = Self {
            storage,
            seen: HashSet::new(),
            did_resume: false,
        };
        frontier.remember_known_urls();
        frontier
    }

    /// Switches the frontier onto a resumable log at `path`
    ///
    /// The previous storage is closed. Every URL already present in the log
    /// counts as enqueued, so it is never added a second time.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the resume log (created if missing)
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The log is open; see [`Frontier::did_resume`]
    /// * `Err(StorageError)` - The log could not be opened or created
    pub fn resume_from(&mut self, path: &Path) -> StorageResult<()> {
        let (storage, resumed) = LogFileStorage::open(path)?;

        self.storage.close()?;
        self.storage = Box::new(storage);
        self.did_resume = resumed;
        self.remember_known_urls();

        tracing::debug!(
            "Frontier opened {} ({} known URLs, resumed: {})",
            path.display(),
            self.seen.len(),
            resumed
        );
        Ok(())
    }

    /// Returns whether the last [`Frontier::resume_from`] continued a prior crawl
    pub fn did_resume(&self) -> bool {
        self.did_resume
    }

    /// Adds a page to crawl later
    ///
    /// The URL is canonicalized first; nothing is stored if that canonical
    /// form was enqueued before.
    ///
    /// # Arguments
    ///
    /// * `url` - An absolute URL
    /// * `depth` - Link distance from the seed
    ///
    /// # Returns
    ///
    /// * `Ok(AddOutcome)` - Whether the URL was queued or suppressed
    /// * `Err(WebcpError::Url)` - The URL cannot be crawled (e.g. `mailto:`)
    /// * `Err(WebcpError::Storage)` - The storage failed to record it
    pub fn add(&mut self, url: &Url, depth: u32) -> Result<AddOutcome, WebcpError> {
        let canonical = canonical_url(url)?;

        if self.crawled(&canonical) {
            return Ok(AddOutcome::Duplicate);
        }

        self.storage.add(&canonical, depth)?;
        self.seen.insert(canonical.into());
        Ok(AddOutcome::Queued)
    }

    /// Removes and returns the next page to crawl, if any
    pub fn next(&mut self) -> StorageResult<Option<FrontierEntry>> {
        self.storage.next()
    }

    /// Returns whether a canonical URL has already been enqueued
    ///
    /// A URL counts as crawled from the moment it is queued, so a page that
    /// is still waiting is not queued again.
    pub fn crawled(&self, url: &Url) -> bool {
        self.seen.contains(url.as_str())
    }

    /// Closes the underlying storage
    pub fn close(&mut self) -> StorageResult<()> {
        self.storage.close()
    }

    fn remember_known_urls(&mut self) {
        for raw in self.storage.known_urls() {
            match parse_canonical(&raw) {
                Ok(url) => {
                    self.seen.insert(url.into());
                }
                Err(_) => {
                    self.seen.insert(raw);
                }
            }
        }
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}
