//! Storage module for persisting crawl metadata
//!
//! One append-only SQLite store per profile holds a row for every
//! processed URL, batch-committed at the end of the run; a process-wide
//! stats store records one row per completed run.

mod schema;
mod sqlite;

pub use schema::{initialize_schema, initialize_stats_schema, SCHEMA_SQL, STATS_SCHEMA_SQL};
pub use sqlite::{MetadataStore, StatsStore};

/// Content-hash sentinel for URLs whose fetch failed
pub const ERROR_HASH: &str = "";

/// Title sentinel for URLs whose fetch failed
pub const ERROR_TITLE: &str = "ERROR";

/// One row per processed URL, success or failure
#[derive(Debug, Clone)]
pub struct UrlRecord {
    /// The fetched URL
    pub url: String,

    /// Owning profile
    pub profile_name: String,

    /// Crawl start timestamp (unix seconds), shared by the whole run
    pub time: i64,

    /// Hex content hash, or [`ERROR_HASH`] for failures
    pub hash: String,

    /// Page title, or [`ERROR_TITLE`] for failures
    pub title: String,
}

impl UrlRecord {
    /// Record for a successfully processed URL
    pub fn success(url: &str, profile_name: &str, time: i64, hash: String, title: String) -> Self {
        Self {
            url: url.to_string(),
            profile_name: profile_name.to_string(),
            time,
            hash,
            title,
        }
    }

    /// Sentinel record for a failed URL, kept so failures stay traceable
    pub fn failure(url: &str, profile_name: &str, time: i64) -> Self {
        Self {
            url: url.to_string(),
            profile_name: profile_name.to_string(),
            time,
            hash: ERROR_HASH.to_string(),
            title: ERROR_TITLE.to_string(),
        }
    }
}
