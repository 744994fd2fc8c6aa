//! Crawler module
//!
//! Fetching, link extraction, the per-profile frontier loop, and the run
//! orchestrator that ties them together.

pub mod fetcher;
pub mod orchestrator;
pub mod page;
pub mod profile_crawler;

pub use fetcher::{build_http_client, fetch_page, FetchError};
pub use orchestrator::CrawlOrchestrator;
pub use page::{extract_page, ExtractedPage};
pub use profile_crawler::{CrawlOutput, ProfileCrawler};

use crate::{Config, Result};

/// Runs one complete crawl for the given configuration
pub async fn crawl(config: &Config) -> Result<()> {
    CrawlOrchestrator::new(config)?.run().await
}
