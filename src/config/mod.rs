//! Configuration module for Spindle
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files: crawl-wide options plus one `[[profile]]` block per crawl target.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlOptions, ProfileEntry};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
