//! Output module for crawl results
//!
//! This module handles:
//! - Saving fetched pages under the destination folder
//! - Recording and printing crawl statistics

mod pages;
pub mod stats;

pub use pages::{page_path, PageFile};
pub use stats::{print_statistics, CrawlStats};
