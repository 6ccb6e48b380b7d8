//! HTML link extraction
//!
//! The crawler only needs one thing from a page: the targets of its anchors.
//! Extraction is behind the [`LinkExtractor`] trait; resolving each target
//! against the page URL is the crawler's job, not the extractor's.

use scraper::{Html, Selector};

/// Produces link targets from a fetched document
pub trait LinkExtractor: Send + Sync {
    /// Returns the raw link targets of `document`, in document order
    ///
    /// # Arguments
    ///
    /// * `document` - The complete response body
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - Unresolved link targets
    /// * `Err(String)` - The document could not be scanned
    fn extract_links(&self, document: &[u8]) -> Result<Vec<String>, String>;
}

/// Extracts `href` values of `<a>` tags using `scraper`
///
/// # Example
///
/// ```
/// use webcp::crawler::{HtmlLinkExtractor, LinkExtractor};
///
/// let html = br#"<html><body><a href="/page">Link</a></body></html>"#;
/// let links = HtmlLinkExtractor::new().extract_links(html).unwrap();
/// assert_eq!(links, vec!["/page".to_string()]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, document: &[u8]) -> Result<Vec<String>, String> {
        let anchors = Selector::parse("a[href]").map_err(|e| e.to_string())?;

        let html = String::from_utf8_lossy(document);
        let document = Html::parse_document(&html);

        let links = document
            .select(&anchors)
            .filter_map(|element| element.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
            .collect();

        Ok(links)
    }
}
