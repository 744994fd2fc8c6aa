//! Spindle: a profile-driven breadth-first web crawler
//!
//! This crate crawls independently configured "profiles" (seed URLs, depth
//! limit, inclusion/exclusion rules), content-addresses every fetched page,
//! and records per-URL metadata and the link graph for later indexing.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod graph;
pub mod profile;
pub mod storage;

use thiserror::Error;

/// Main error type for Spindle operations
#[derive(Debug, Error)]
pub enum SpindleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store error for profile {profile}: {source}")]
    Store {
        profile: String,
        source: rusqlite::Error,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern in config: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Spindle operations
pub type Result<T> = std::result::Result<T, SpindleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use profile::Profile;
