//! URL handling module for webcp
//!
//! This module provides URL canonicalization (used for deduplication and for
//! the resume log) and the host key used for per-host rate limiting.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::host_key;
pub use normalize::{canonical_url, parse_canonical};

/// Returns true if the URL uses a scheme the crawler can fetch
pub fn is_crawlable_scheme(scheme: &str) -> bool {
    matches!(scheme, "http" | "https")
}
