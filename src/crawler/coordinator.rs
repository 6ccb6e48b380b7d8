//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop. It runs on a single logical thread
//! of control: one entry is dequeued, rate-limited, fetched, saved and
//! parsed before the next one is dequeued.
//!
//! The loop has two phases. While *seeding*, the seed URL is enqueued at
//! depth 1 unless a resumed log already supplied the frontier. While
//! *draining*, entries are processed until the frontier is exhausted.

use crate::config::CrawlSession;
use crate::crawler::fetcher::{build_http_client, fetch_url, is_html, stream_body, PageTee};
use crate::crawler::frontier::{AddOutcome, Frontier};
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::rate_limiter::RateLimiter;
use crate::output::{CrawlStats, PageFile};
use crate::storage::FrontierEntry;
use crate::url::host_key;
use crate::WebcpError;
use reqwest::Client;
use std::io::Write;
use std::time::Instant;
use url::Url;

/// How often progress is logged, in pages
const PROGRESS_INTERVAL: u64 = 10;

/// Main crawler structure
pub struct Crawler {
    session: CrawlSession,
    frontier: Frontier,
    limiter: RateLimiter,
    client: Client,
    extractor: Box<dyn LinkExtractor>,
    stats: CrawlStats,
}

impl Crawler {
    /// Creates a new crawler for a session
    ///
    /// Opens the resume log if the session names one.
    ///
    /// # Arguments
    ///
    /// * `session` - The validated crawl session
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(WebcpError)` - The resume log or HTTP client could not be set up
    pub fn new(session: CrawlSession) -> Result<Self, WebcpError> {
        let mut frontier = Frontier::new();
        if let Some(path) = &session.resume {
            frontier.resume_from(path)?;
        }
        Self::with_frontier(session, frontier)
    }

    /// Creates a crawler over an existing frontier
    ///
    /// The session's resume path is not consulted.
    pub fn with_frontier(session: CrawlSession, frontier: Frontier) -> Result<Self, WebcpError> {
        let client = build_http_client(&session.http)?;
        let limiter = RateLimiter::new(session.delay);

        Ok(Self {
            session,
            frontier,
            limiter,
            client,
            extractor: Box::new(HtmlLinkExtractor::new()),
            stats: CrawlStats::default(),
        })
    }

    /// Replaces the link extractor
    pub fn with_extractor(mut self, extractor: Box<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Returns the session this crawler runs
    pub fn session(&self) -> &CrawlSession {
        &self.session
    }

    /// Returns the frontier
    pub fn frontier_mut(&mut self) -> &mut Frontier {
        &mut self.frontier
    }

    /// Returns the statistics gathered so far
    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Runs the crawl until the frontier is exhausted
    ///
    /// The frontier is closed when this returns, whether or not the crawl
    /// succeeded.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - The frontier was exhausted
    /// * `Err(WebcpError)` - The frontier could not be read
    pub async fn run(&mut self) -> Result<CrawlStats, WebcpError> {
        let result = self.crawl().await;

        if let Err(e) = self.frontier.close() {
            tracing::warn!("Failed to close frontier: {}", e);
        }

        result.map(|()| self.stats.clone())
    }

    async fn crawl(&mut self) -> Result<(), WebcpError> {
        let start_time = Instant::now();

        if self.frontier.did_resume() {
            tracing::info!("Resuming previous crawl; seed not enqueued");
        } else {
            let seed = self.session.seed.clone();
            tracing::info!("Seeding frontier with {}", seed);
            self.enqueue(&seed, 1)?;
        }

        while let Some(entry) = self.frontier.next()? {
            self.process_entry(&entry).await;

            let attempted = self.stats.pages_attempted();
            if attempted % PROGRESS_INTERVAL == 0 {
                let rate = attempted as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages crawled, {} links enqueued, {:.2} pages/sec",
                    attempted,
                    self.stats.links_enqueued,
                    rate
                );
            }
        }

        tracing::info!(
            "Frontier is empty, crawl complete: {} pages in {:?}",
            self.stats.pages_attempted(),
            start_time.elapsed()
        );
        Ok(())
    }

    /// Fetches one dequeued entry, saving it when a destination is set
    async fn process_entry(&mut self, entry: &FrontierEntry) {
        tracing::debug!("Processing URL: {} (depth {})", entry.url, entry.depth);

        let page = self
            .session
            .destination
            .as_deref()
            .map(|dest| PageFile::new(dest, &entry.url));
        let Some(mut page) = page else {
            self.fetch(&entry.url, entry.depth, None).await;
            return;
        };

        if self.fetch(&entry.url, entry.depth, Some(&mut page)).await {
            tracing::debug!("Saved {} to {}", entry.url, page.path().display());
            self.stats.pages_saved += 1;
        } else if page.is_created() {
            let path = page.path().to_path_buf();
            if let Err(e) = page.discard() {
                tracing::warn!("Could not remove partial page {} - {}", path.display(), e);
            }
        }
    }

    /// Fetches a page, follows its links below the depth limit, and copies
    /// the body to `sink` if one is given
    ///
    /// 1. Waits for the host's politeness delay
    /// 2. Sends a GET request; a transport failure abandons the page
    /// 3. Below `max_depth`, streams an HTML body to the link extractor (and
    ///    the sink, through the same read) and enqueues every resolved link
    ///    at `depth + 1`
    /// 4. At or beyond `max_depth`, or for non-HTML bodies, only copies the
    ///    body to the sink
    ///
    /// The body is always read to the end. If reading fails partway, links
    /// in the part already received are still followed. Errors are logged,
    /// never returned.
    ///
    /// # Returns
    ///
    /// `true` if a sink was given and received the complete body
    pub async fn fetch(
        &mut self,
        url: &Url,
        depth: u32,
        sink: Option<&mut (dyn Write + Send)>,
    ) -> bool {
        if let Some(host) = host_key(url) {
            self.limiter.wait(&host).await;
        }

        let response = match fetch_url(&self.client, url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Could not fetch {} - {}", url, e);
                self.stats.fetch_failures += 1;
                return false;
            }
        };

        let parse = depth < self.session.max_depth && is_html(&response);
        let mut tee = PageTee::new(url, sink, parse);
        let read_result = stream_body(response, &mut tee).await;
        let output = tee.finish();
        self.stats.bytes_read += output.bytes;

        let complete = match read_result {
            Ok(()) => {
                self.stats.pages_fetched += 1;
                true
            }
            Err(e) => {
                tracing::warn!("Could not read {} - {}", url, e);
                self.stats.fetch_failures += 1;
                false
            }
        };

        if let Some(document) = output.document {
            self.follow_links(url, &document, depth + 1);
        }

        complete && output.saved
    }

    /// Extracts links from a page and enqueues them at `depth`
    fn follow_links(&mut self, source: &Url, document: &[u8], depth: u32) {
        let links = match self.extractor.extract_links(document) {
            Ok(links) => links,
            Err(message) => {
                let e = WebcpError::HtmlParse {
                    url: source.to_string(),
                    message,
                };
                tracing::warn!("{}", e);
                return;
            }
        };

        for link in links {
            let target = match source.join(&link) {
                Ok(target) => target,
                Err(e) => {
                    tracing::debug!("Skipping link {:?} on {}: {}", link, source, e);
                    continue;
                }
            };

            if let Err(e) = self.enqueue(&target, depth) {
                tracing::debug!("Skipping link {} on {}: {}", target, source, e);
            }
        }
    }

    /// Adds a URL to the frontier, updating counters
    fn enqueue(&mut self, url: &Url, depth: u32) -> Result<(), WebcpError> {
        match self.frontier.add(url, depth)? {
            AddOutcome::Queued => self.stats.links_enqueued += 1,
            AddOutcome::Duplicate => self.stats.duplicates_skipped += 1,
        }
        Ok(())
    }
}

/// Runs a complete crawl for a session
///
/// # Example
///
/// ```no_run
/// use webcp::config::{load_session, SessionArgs};
/// use webcp::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = load_session(
///     SessionArgs {
///         seed: "https://example.com/".to_string(),
///         destination: "./mirror".into(),
///         ..Default::default()
///     },
///     None,
/// )?;
/// let stats = run_crawl(session).await?;
/// println!("{} pages fetched", stats.pages_fetched);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(session: CrawlSession) -> Result<CrawlStats, WebcpError> {
    let mut crawler = Crawler::new(session)?;
    crawler.run().await
}
