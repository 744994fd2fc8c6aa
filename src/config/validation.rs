use crate::config::types::{Config, CrawlOptions, ProfileEntry};
use crate::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_options(&config.crawl)?;

    if config.profiles.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[profile]] is required".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for profile in &config.profiles {
        if !names.insert(profile.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate profile name '{}'",
                profile.name
            )));
        }
        validate_profile(profile)?;
    }

    Ok(())
}

/// Validates crawl-wide options
fn validate_crawl_options(options: &CrawlOptions) -> Result<(), ConfigError> {
    for (field, value) in [
        ("cache-dir", &options.cache_dir),
        ("graph-dir", &options.graph_dir),
        ("database-dir", &options.database_dir),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} cannot be empty",
                field
            )));
        }
    }
    Ok(())
}

/// Validates a single profile entry
fn validate_profile(profile: &ProfileEntry) -> Result<(), ConfigError> {
    if profile.name.is_empty() {
        return Err(ConfigError::Validation(
            "profile name cannot be empty".to_string(),
        ));
    }

    if profile.depth < 1 {
        return Err(ConfigError::Validation(format!(
            "profile '{}': depth must be >= 1, got {}",
            profile.name, profile.depth
        )));
    }

    if profile.locations.is_empty() {
        return Err(ConfigError::Validation(format!(
            "profile '{}': at least one seed location is required",
            profile.name
        )));
    }

    for location in &profile.locations {
        let url = Url::parse(location).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "profile '{}': seed '{}': {}",
                profile.name, location, e
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "profile '{}': seed '{}' must be http or https",
                profile.name, location
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "profile '{}': seed '{}' has no host",
                profile.name, location
            )));
        }
    }

    for pattern in profile.filter.iter().chain(profile.matches.iter()) {
        Regex::new(pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!(
                "profile '{}': pattern '{}': {}",
                profile.name, pattern, e
            ))
        })?;
    }

    Ok(())
}
