//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The deduplicating frontier over pluggable storage
//! - Per-host rate limiting
//! - HTTP fetching with a fan-out body reader
//! - HTML link extraction
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod rate_limiter;

pub use coordinator::{run_crawl, Crawler};
pub use fetcher::{
    build_http_client, fetch_url, is_html, stream_body, PageTee, TeeOutput, MAX_PARSE_BYTES,
};
pub use frontier::{AddOutcome, Frontier};
pub use parser::{HtmlLinkExtractor, LinkExtractor};
pub use rate_limiter::RateLimiter;

use crate::config::CrawlSession;
use crate::output::CrawlStats;
use crate::WebcpError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the resume log, if the session names one
/// 2. Build the HTTP client
/// 3. Enqueue the seed unless a previous crawl is being resumed
/// 4. Fetch pages breadth-first until the frontier is exhausted
/// 5. Close the frontier
///
/// # Arguments
///
/// * `session` - The validated crawl session
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed
/// * `Err(WebcpError)` - Crawl could not start, or the frontier failed
pub async fn crawl(session: CrawlSession) -> Result<CrawlStats, WebcpError> {
    run_crawl(session).await
}
