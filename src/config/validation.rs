use crate::url::is_crawlable_scheme;
use crate::{ConfigError, ConfigResult};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Validates the seed URL
///
/// The seed must be an absolute `http` or `https` URL.
pub fn validate_seed(seed: &str) -> ConfigResult<Url> {
    if seed.is_empty() {
        return Err(ConfigError::InvalidUrl("<url> is required".to_string()));
    }

    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid URL {:?}: {}", seed, e)))?;

    if !is_crawlable_scheme(url.scheme()) {
        return Err(ConfigError::Validation(format!(
            "Can't fetch {} URL {}",
            url.scheme(),
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!("URL has no host: {}", seed)));
    }

    Ok(url)
}

/// Validates the per-host delay and converts it to a `Duration`
pub fn validate_delay(secs: f64) -> ConfigResult<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| {
        ConfigError::Validation(format!(
            "delay must be a non-negative number of seconds, got {} ({})",
            secs, e
        ))
    })
}

/// Ensures the destination folder exists, creating it if needed
pub fn prepare_destination(path: &Path) -> ConfigResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("<dest> is required".to_string()));
    }

    std::fs::create_dir_all(path).map_err(|e| {
        ConfigError::Validation(format!(
            "Cannot create destination {}: {}",
            path.display(),
            e
        ))
    })?;

    if !path.is_dir() {
        return Err(ConfigError::Validation(format!(
            "Destination {} is not a directory",
            path.display()
        )));
    }

    Ok(())
}

/// Validates the resume log path
pub fn validate_resume_path(path: &Path) -> ConfigResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "resume path cannot be empty".to_string(),
        ));
    }

    if path.is_dir() {
        return Err(ConfigError::Validation(format!(
            "resume path {} is a directory",
            path.display()
        )));
    }

    Ok(())
}
