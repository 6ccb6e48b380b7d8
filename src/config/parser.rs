use crate::config::types::{
    ConfigFile, CrawlSession, HttpConfig, SessionArgs, DEFAULT_DELAY_SECS, DEFAULT_MAX_DEPTH,
};
use crate::config::validation::{
    prepare_destination, validate_delay, validate_resume_path, validate_seed,
};
use crate::ConfigResult;
use std::path::Path;
use std::time::Duration;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(ConfigFile)` - Successfully parsed configuration
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_config(path: &Path) -> ConfigResult<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config: ConfigFile = toml::from_str(&content)?;
    Ok(config)
}

/// Merges command-line values with a configuration file and validates them
///
/// Command-line values win over the file; the file wins over defaults.
/// The destination folder is created when page saving is enabled.
///
/// # Arguments
///
/// * `args` - Values from the command line
/// * `file` - Parsed configuration file (use `ConfigFile::default()` if none)
///
/// # Returns
///
/// * `Ok(CrawlSession)` - A session ready to crawl
/// * `Err(ConfigError)` - Some value is invalid
pub fn build_session(args: SessionArgs, file: ConfigFile) -> ConfigResult<CrawlSession> {
    let seed = validate_seed(&args.seed)?;

    let delay_secs = args
        .delay_secs
        .or(file.crawler.delay_secs)
        .unwrap_or(DEFAULT_DELAY_SECS);
    let delay = validate_delay(delay_secs)?;

    let max_depth = args
        .max_depth
        .or(file.crawler.max_depth)
        .unwrap_or(DEFAULT_MAX_DEPTH);

    let resume = args.resume.or(file.crawler.resume);
    if let Some(path) = &resume {
        validate_resume_path(path)?;
    }

    let save_pages = args.save_pages.or(file.crawler.save_pages).unwrap_or(true);
    let destination = if save_pages {
        prepare_destination(&args.destination)?;
        Some(args.destination)
    } else {
        None
    };

    let defaults = HttpConfig::default();
    let http = HttpConfig {
        user_agent: file.http.user_agent.unwrap_or(defaults.user_agent),
        timeout: file.http.timeout_secs.map(Duration::from_secs),
        connect_timeout: file.http.connect_timeout_secs.map(Duration::from_secs),
    };

    Ok(CrawlSession {
        seed,
        destination,
        max_depth,
        delay,
        resume,
        http,
    })
}

/// Loads the optional configuration file and builds the session
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use webcp::config::{load_session, SessionArgs};
///
/// let args = SessionArgs {
///     seed: "https://example.com/".to_string(),
///     destination: "./mirror".into(),
///     ..Default::default()
/// };
/// let session = load_session(args, Some(Path::new("webcp.toml"))).unwrap();
/// println!("Delay: {:?}", session.delay);
/// ```
pub fn load_session(
    args: SessionArgs,
    config_path: Option<&Path>,
) -> ConfigResult<CrawlSession> {
    let file = match config_path {
        Some(path) => load_config(path)?,
        None => ConfigFile::default(),
    };
    build_session(args, file)
}
