use crate::storage::traits::{FrontierStorage, StorageResult};
use crate::storage::FrontierEntry;
use std::collections::VecDeque;
use url::Url;

/// Volatile frontier storage
///
/// Entries are kept in insertion order and handed out first-in first-out.
/// Together with the crawler enqueuing discovered links at `depth + 1`, this
/// yields breadth-first traversal. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: VecDeque<FrontierEntry>,
}

impl MemoryStorage {
    /// Creates an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of pending entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether no entries are pending
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FrontierStorage for MemoryStorage {
    fn add(&mut self, url: &Url, depth: u32) -> StorageResult<()> {
        self.items.push_back(FrontierEntry::new(url.clone(), depth));
        Ok(())
    }

    fn next(&mut self) -> StorageResult<Option<FrontierEntry>> {
        Ok(self.items.pop_front())
    }

    fn close(&mut self) -> StorageResult<()> {
        Ok(())
    }
}
