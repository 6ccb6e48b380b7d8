use crate::url::is_crawlable_scheme;
use crate::{UrlError, UrlResult};
use url::Url;

/// Produces the canonical form of a URL
///
/// The canonical form is what the frontier deduplicates on and what the
/// resume log records.
///
/// # Canonicalization Steps
///
/// 1. Reject schemes other than `http` and `https`
/// 2. Reject URLs without a host
/// 3. Lowercase scheme and host, drop the default port, resolve `.` and `..`
///    path segments (performed by the `url` parser on construction)
/// 4. Remove the fragment
/// 5. Remove an empty query string (trailing `?`)
///
/// Path case and query parameter order are left untouched: both are
/// significant to most servers.
///
/// # Arguments
///
/// * `url` - The URL to canonicalize
///
/// # Returns
///
/// * `Ok(Url)` - The canonical URL
/// * `Err(UrlError)` - The URL cannot be crawled
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webcp::url::canonical_url;
///
/// let url = Url::parse("HTTP://Example.COM:80/a/../b#top").unwrap();
/// assert_eq!(canonical_url(&url).unwrap().as_str(), "http://example.com/b");
/// ```
pub fn canonical_url(url: &Url) -> UrlResult<Url> {
    if !is_crawlable_scheme(url.scheme()) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    let mut canonical = url.clone();
    canonical.set_fragment(None);

    if canonical.query() == Some("") {
        canonical.set_query(None);
    }

    Ok(canonical)
}

/// Parses a string and returns its canonical form
///
/// # Examples
///
/// ```
/// use webcp::url::parse_canonical;
///
/// let url = parse_canonical("https://EXAMPLE.com:443").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
/// ```
pub fn parse_canonical(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonical_url(&url)
}
