//! Run orchestration
//!
//! Owns everything shared by a run: the run timestamp, the content cache,
//! the per-profile metadata stores, and the stats store. Profiles crawl
//! concurrently as independent tasks; every store commit happens here,
//! after the crawls return, so no SQLite connection ever crosses a task
//! boundary.

use crate::cache::ContentCache;
use crate::crawler::profile_crawler::{CrawlOutput, ProfileCrawler};
use crate::storage::{MetadataStore, StatsStore};
use crate::{Config, Profile, Result, SpindleError};
use chrono::Local;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Stats store filename, shared by every run against the same database dir
const STATS_DB: &str = "crawl_stats.db";

/// Drives one complete crawl run across all configured profiles
pub struct CrawlOrchestrator {
    profiles: Vec<Arc<Profile>>,
    stores: HashMap<String, MetadataStore>,
    stats: StatsStore,
    cache: Arc<ContentCache>,
    run_time: i64,
    graph_run_dir: PathBuf,
}

impl CrawlOrchestrator {
    /// Prepares a run: creates the output directories, compiles profiles,
    /// and opens every store up front so configuration problems surface
    /// before any fetch
    pub fn new(config: &Config) -> Result<Self> {
        let now = Local::now();
        let run_time = now.timestamp();

        let cache_dir = Path::new(&config.crawl.cache_dir);
        std::fs::create_dir_all(cache_dir)?;

        // Each run snapshots its graphs into a fresh timestamped subdir.
        let graph_run_dir =
            Path::new(&config.crawl.graph_dir).join(now.format("%Y-%m-%d_%H-%M-%S").to_string());
        std::fs::create_dir_all(&graph_run_dir)?;

        let database_dir = Path::new(&config.crawl.database_dir);
        std::fs::create_dir_all(database_dir)?;

        let mut profiles = Vec::new();
        let mut stores = HashMap::new();
        for entry in &config.profiles {
            let profile = Arc::new(Profile::from_entry(entry)?);
            let store = MetadataStore::open(&database_dir.join(format!("{}.db", profile.name)))
                .map_err(|source| SpindleError::Store {
                    profile: profile.name.clone(),
                    source,
                })?;
            stores.insert(profile.name.clone(), store);
            profiles.push(profile);
        }

        let stats = StatsStore::open(&database_dir.join(STATS_DB))?;
        let cache = Arc::new(ContentCache::new(cache_dir));

        Ok(Self {
            profiles,
            stores,
            stats,
            cache,
            run_time,
            graph_run_dir,
        })
    }

    /// Runs every profile to completion, then commits and flushes
    ///
    /// A failed profile task is logged and reported but never blocks the
    /// other profiles or the final commit of their records.
    pub async fn run(mut self) -> Result<()> {
        let mut crawls = JoinSet::new();
        for profile in &self.profiles {
            let crawler = ProfileCrawler::new(
                Arc::clone(profile),
                Arc::clone(&self.cache),
                self.run_time,
                self.graph_run_dir.join(format!("{}.json", profile.name)),
            )?;

            tracing::info!(
                "[{}] Starting crawl: {} seeds, depth {}",
                profile.name,
                profile.seeds.len(),
                profile.depth
            );
            crawls.spawn(crawler.run());
        }

        let mut outputs = Vec::new();
        let mut first_err: Option<SpindleError> = None;
        while let Some(joined) = crawls.join_next().await {
            match joined {
                Ok(output) => {
                    tracing::info!(
                        "[{}] Finished: {} records, {} URLs left queued",
                        output.profile_name,
                        output.records.len(),
                        output.leftover_queue
                    );
                    outputs.push(output);
                }
                Err(e) => {
                    tracing::error!("Profile crawl task failed: {}", e);
                    first_err.get_or_insert(SpindleError::Join(e));
                }
            }
        }

        self.finish(outputs).await?;

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Commits every profile's batch and drains the cache's pending writes
    ///
    /// Commits are independent; one profile's commit failure leaves the
    /// others intact and is surfaced after all of them have been tried.
    async fn finish(&mut self, outputs: Vec<CrawlOutput>) -> Result<()> {
        let cache = Arc::clone(&self.cache);

        let commit = async {
            let mut first_err: Option<SpindleError> = None;
            for output in &outputs {
                let Some(store) = self.stores.get_mut(&output.profile_name) else {
                    continue;
                };
                match store.commit_batch(&output.records) {
                    Ok(()) => tracing::info!(
                        "[{}] Committed {} records",
                        output.profile_name,
                        output.records.len()
                    ),
                    Err(source) => {
                        tracing::error!(
                            "[{}] Failed to commit records: {}",
                            output.profile_name,
                            source
                        );
                        first_err.get_or_insert(SpindleError::Store {
                            profile: output.profile_name.clone(),
                            source,
                        });
                    }
                }
            }
            first_err
        };

        let (commit_err, ()) = tokio::join!(commit, cache.flush());

        // The stats row marks run completion, committed or not.
        self.stats.record_run(self.run_time)?;

        match commit_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
