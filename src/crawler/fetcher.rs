//! HTTP fetcher implementation
//!
//! This module handles all HTTP traffic for the crawler:
//! - Building the HTTP client from the session's HTTP settings
//! - Issuing GET requests
//! - Streaming response bodies through a [`PageTee`], which hands every chunk
//!   to the page sink and to the link parser in lock-step
//!
//! Only HTML responses are kept for parsing, and at most
//! [`MAX_PARSE_BYTES`] of each. The sink always receives the whole body.

use crate::config::HttpConfig;
use crate::WebcpError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::io::Write;
use url::Url;

/// Largest prefix of a page kept for link extraction
pub const MAX_PARSE_BYTES: usize = 8 * 1024 * 1024;

/// Builds an HTTP client with the configured user agent and timeouts
///
/// Timeouts left unset fall back to the transport defaults.
///
/// # Example
///
/// ```
/// use webcp::config::HttpConfig;
/// use webcp::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    builder.build()
}

/// Sends a GET request for `url`
///
/// Any HTTP status is accepted; only transport failures are errors.
pub async fn fetch_url(client: &Client, url: &Url) -> Result<Response, WebcpError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| WebcpError::Http {
            url: url.to_string(),
            source,
        })?;

    tracing::debug!("GET {} -> {}", url, response.status());
    Ok(response)
}

/// Returns whether a response may hold HTML worth scanning for links
///
/// A missing Content-Type is given the benefit of the doubt.
pub fn is_html(response: &Response) -> bool {
    match response.headers().get(CONTENT_TYPE) {
        Some(value) => value
            .to_str()
            .map(is_html_content_type)
            .unwrap_or(false),
        None => true,
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Duplicating writer for a response body
///
/// Every chunk fed in is written to the sink (when present) and appended to
/// the parse buffer (when parsing), before the next chunk is read. With
/// neither consumer attached the chunk is simply discarded. The parse buffer
/// stops growing at its limit; later bytes still reach the sink.
pub struct PageTee<'u, 's> {
    url: &'u Url,
    sink: Option<&'s mut (dyn Write + Send)>,
    document: Option<Vec<u8>>,
    parse_limit: usize,
    saved: bool,
    truncated: bool,
    bytes: u64,
}

/// What a [`PageTee`] collected once the body has been read
#[derive(Debug, Default)]
pub struct TeeOutput {
    /// The complete body, if it was collected for parsing
    pub document: Option<Vec<u8>>,

    /// Whether every chunk reached the sink
    pub saved: bool,

    /// Whether the document was cut at the parse limit
    pub truncated: bool,

    /// Total body size in bytes
    pub bytes: u64,
}

impl<'u, 's> PageTee<'u, 's> {
    /// Creates a tee for the page at `url`
    ///
    /// # Arguments
    ///
    /// * `url` - Page being read, used in log messages
    /// * `sink` - Optional destination for the raw body
    /// * `parse` - Whether to keep a copy of the body for link extraction
    pub fn new(url: &'u Url, sink: Option<&'s mut (dyn Write + Send)>, parse: bool) -> Self {
        let saved = sink.is_some();
        Self {
            url,
            sink,
            document: parse.then(Vec::new),
            parse_limit: MAX_PARSE_BYTES,
            saved,
            truncated: false,
            bytes: 0,
        }
    }

    /// Caps the parse buffer at `limit` bytes instead of [`MAX_PARSE_BYTES`]
    pub fn with_parse_limit(mut self, limit: usize) -> Self {
        self.parse_limit = limit;
        self
    }

    /// Passes one chunk to both consumers
    ///
    /// A sink write failure detaches the sink for the rest of the page; the
    /// parse copy is unaffected.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.bytes += chunk.len() as u64;

        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.write_all(chunk) {
                tracing::warn!("Could not save {} - {}", self.url, e);
                self.sink = None;
                self.saved = false;
            }
        }

        if let Some(document) = self.document.as_mut() {
            let room = self.parse_limit.saturating_sub(document.len());
            if chunk.len() > room {
                if !self.truncated {
                    tracing::debug!(
                        "Only scanning the first {} bytes of {}",
                        self.parse_limit,
                        self.url
                    );
                }
                self.truncated = true;
            }
            document.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }
    }

    /// Flushes the sink and returns what was collected
    pub fn finish(mut self) -> TeeOutput {
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.flush() {
                tracing::warn!("Could not save {} - {}", self.url, e);
                self.saved = false;
            }
        }

        TeeOutput {
            document: self.document,
            saved: self.saved,
            truncated: self.truncated,
            bytes: self.bytes,
        }
    }
}

/// Reads a response body to completion, feeding each chunk to `tee`
pub async fn stream_body(
    mut response: Response,
    tee: &mut PageTee<'_, '_>,
) -> Result<(), reqwest::Error> {
    while let Some(chunk) = response.chunk().await? {
        tee.feed(&chunk);
    }
    Ok(())
}
