//! Line format of the resume log
//!
//! The log is UTF-8 text, one record per line:
//!
//! ```text
//! 1 http://example.com/
//! - http://example.com/
//! 2 http://example.com/about.html
//! ```
//!
//! A pending record is `<depth> <url>`; a completed marker is `- <url>`
//! and refers to a URL previously written as a pending record. The URL is
//! everything after the first space and is kept verbatim.

use std::fmt;
use thiserror::Error;

/// Prefix that marks a completed record
const COMPLETED_PREFIX: &str = "- ";

/// A single record of the resume log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// A page waiting to be crawled
    Pending { depth: u32, url: String },

    /// A page that has been handed to the crawler
    Completed { url: String },
}

/// Reasons a log line cannot be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogLineError {
    #[error("Invalid line in resume file: {0:?}")]
    FieldCount(String),

    #[error("Invalid depth field in resume file: {0:?}")]
    Depth(String),

    #[error("Invalid URL in resume file: {0:?}")]
    Url(String),
}

impl LogRecord {
    /// Parses one line of the log
    ///
    /// The trailing newline (and a carriage return before it) is ignored.
    /// URL syntax is not checked here; see [`LogLineError::Url`].
    pub fn parse(line: &str) -> Result<Self, LogLineError> {
        let line = line.trim_end_matches(['\n', '\r']);

        if let Some(url) = line.strip_prefix(COMPLETED_PREFIX) {
            return Ok(Self::Completed {
                url: url.to_string(),
            });
        }

        let (depth, url) = line
            .split_once(' ')
            .ok_or_else(|| LogLineError::FieldCount(line.to_string()))?;

        let depth = depth
            .parse::<u32>()
            .map_err(|_| LogLineError::Depth(depth.to_string()))?;

        Ok(Self::Pending {
            depth,
            url: url.to_string(),
        })
    }

    /// Returns the URL string carried by this record
    pub fn url(&self) -> &str {
        match self {
            Self::Pending { url, .. } | Self::Completed { url } => url,
        }
    }

    /// Returns true for completed markers
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

impl fmt::Display for LogRecord {
    /// Formats the record as a newline-terminated log line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending { depth, url } => writeln!(f, "{} {}", depth, url),
            Self::Completed { url } => writeln!(f, "{}{}", COMPLETED_PREFIX, url),
        }
    }
}
