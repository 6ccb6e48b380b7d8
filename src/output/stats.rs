//! Statistics for a single crawl run
//!
//! The crawler updates these counters as it goes; they are logged as
//! progress and printed once the frontier is exhausted.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Pages fetched successfully (any HTTP status)
    pub pages_fetched: u64,

    /// Pages abandoned because the request or body read failed
    pub fetch_failures: u64,

    /// Links added to the frontier
    pub links_enqueued: u64,

    /// Links skipped because their canonical URL was already enqueued
    pub duplicates_skipped: u64,

    /// Pages fully written to the destination folder
    pub pages_saved: u64,

    /// Total response bytes read
    pub bytes_read: u64,
}

impl CrawlStats {
    /// Number of frontier entries processed so far
    pub fn pages_attempted(&self) -> u64 {
        self.pages_fetched + self.fetch_failures
    }

    /// Share of attempted pages that were fetched, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_attempted();
        if attempted == 0 {
            0.0
        } else {
            (self.pages_fetched as f64 / attempted as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `elapsed` - Wall-clock duration of the run
pub fn print_statistics(stats: &CrawlStats, elapsed: Duration) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Fetch failures: {}", stats.fetch_failures);
    println!("  Pages saved: {}", stats.pages_saved);
    println!("  Bytes read: {}", stats.bytes_read);
    println!();

    println!("Links:");
    println!("  Enqueued: {}", stats.links_enqueued);
    println!("  Duplicates skipped: {}", stats.duplicates_skipped);
    println!();

    let rate = if elapsed.as_secs_f64() > 0.0 {
        stats.pages_attempted() as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched) in {:.1?} ({:.2} pages/sec)",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_attempted(),
        elapsed,
        rate
    );
}
