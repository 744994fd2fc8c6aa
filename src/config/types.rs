use serde::Deserialize;

/// Main configuration structure for Spindle
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlOptions,
    #[serde(default, rename = "profile")]
    pub profiles: Vec<ProfileEntry>,
}

/// Crawl-wide options shared by every profile
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlOptions {
    /// Directory for the content-addressed page cache
    #[serde(rename = "cache-dir")]
    pub cache_dir: String,

    /// Directory for per-run graph snapshot subdirectories
    #[serde(rename = "graph-dir")]
    pub graph_dir: String,

    /// Directory holding one metadata store file per profile
    #[serde(rename = "database-dir")]
    pub database_dir: String,

    /// Optional log destination; stderr when absent
    #[serde(rename = "log-file")]
    pub log_file: Option<String>,

    /// Raises the default log level to debug
    #[serde(default)]
    pub debug: bool,
}

/// One crawl profile as written in the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEntry {
    /// Unique profile name; also names the metadata store file
    pub name: String,

    /// Seed URLs the crawl starts from
    pub locations: Vec<String>,

    /// Number of breadth-first rounds to run
    pub depth: u32,

    /// Exclusion patterns; a matching URL is never fetched
    #[serde(default)]
    pub filter: Vec<String>,

    /// Inclusion patterns; when non-empty, only matching URLs are fetched
    #[serde(default, rename = "match")]
    pub matches: Vec<String>,

    /// Restrict the crawl to the first seed's domain
    #[serde(rename = "same-domain", default)]
    pub same_domain: bool,
}
