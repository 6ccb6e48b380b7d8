//! Configuration module for webcp
//!
//! A crawl session is assembled from command-line values, an optional TOML
//! configuration file, and built-in defaults, then validated before any
//! request is made.
//!
//! # Example
//!
//! ```no_run
//! use webcp::config::{load_session, SessionArgs};
//!
//! let args = SessionArgs {
//!     seed: "https://example.com/".to_string(),
//!     destination: "./mirror".into(),
//!     ..Default::default()
//! };
//! let session = load_session(args, None).unwrap();
//! println!("Crawler will use max depth: {}", session.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ConfigFile, CrawlSession, CrawlerSection, HttpConfig, HttpSection, SessionArgs,
    DEFAULT_DELAY_SECS, DEFAULT_MAX_DEPTH,
};

// Re-export parser functions
pub use parser::{build_session, load_config, load_session};
