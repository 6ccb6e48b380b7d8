use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default delay between requests to one host, in seconds
pub const DEFAULT_DELAY_SECS: f64 = 5.0;

/// Default maximum crawl depth
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// A validated crawl session
///
/// Built once at startup and never modified while the crawl runs.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSession {
    /// Absolute URL the crawl starts from (depth 1)
    pub seed: Url,

    /// Folder that fetched pages are saved under; `None` disables saving
    pub destination: Option<PathBuf>,

    /// Pages at this depth are fetched but their links are not followed
    pub max_depth: u32,

    /// Minimum time between requests to the same host
    pub delay: Duration,

    /// Log file used to persist and resume the frontier
    pub resume: Option<PathBuf>,

    /// HTTP client settings
    pub http: HttpConfig,
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Overall per-request timeout; transport default when unset
    pub timeout: Option<Duration>,

    /// Connection timeout; transport default when unset
    pub connect_timeout: Option<Duration>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("webcp/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
            connect_timeout: None,
        }
    }
}

/// Values supplied on the command line
///
/// Options left as `None` fall back to the config file, then to defaults.
#[derive(Debug, Clone, Default)]
pub struct SessionArgs {
    pub seed: String,
    pub destination: PathBuf,
    pub delay_secs: Option<f64>,
    pub max_depth: Option<u32>,
    pub resume: Option<PathBuf>,
    pub save_pages: Option<bool>,
}

/// Contents of an optional TOML configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub crawler: CrawlerSection,

    #[serde(default)]
    pub http: HttpSection,
}

/// `[crawler]` table of the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlerSection {
    /// Minimum time between requests to the same host (seconds)
    #[serde(rename = "delay-secs")]
    pub delay_secs: Option<f64>,

    /// Maximum depth to follow links to
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Resume log path
    pub resume: Option<PathBuf>,

    /// Whether to save fetched pages under the destination folder
    #[serde(rename = "save-pages")]
    pub save_pages: Option<bool>,
}

/// `[http]` table of the configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpSection {
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,

    /// Overall request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: Option<u64>,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: Option<u64>,
}
