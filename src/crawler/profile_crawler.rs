//! Per-profile frontier-expansion loop
//!
//! One crawler owns one profile's frontier state, link graph, and metadata
//! batch. Each round fetches the whole frontier concurrently, then a single
//! collector loop applies every completion to the crawler's state, so the
//! frontier sets, graph, and record batch are never mutated from two tasks
//! at once.

use crate::cache::ContentCache;
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchError};
use crate::crawler::page::extract_page;
use crate::graph::LinkGraph;
use crate::profile::Profile;
use crate::storage::UrlRecord;
use crate::SpindleError;
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Cap on simultaneous connections to any one host
const MAX_HOST_CONNECTIONS: usize = 50;

/// Result of one profile's finished crawl, handed to the orchestrator
#[derive(Debug)]
pub struct CrawlOutput {
    /// The profile that produced these records
    pub profile_name: String,

    /// One record per processed URL, success or failure
    pub records: Vec<UrlRecord>,

    /// URLs for which a fetch was attempted
    pub visited_count: usize,

    /// Admissible URLs left in the queue when the depth limit hit
    pub leftover_queue: usize,
}

/// Crawls one profile breadth-first up to its depth limit
pub struct ProfileCrawler {
    profile: Arc<Profile>,
    client: Client,
    cache: Arc<ContentCache>,
    graph: LinkGraph,
    records: Vec<UrlRecord>,

    // Frontier state, owned exclusively by this crawler.
    visited: HashSet<String>,
    current_queue: HashSet<String>,
    next_queue: HashSet<String>,

    host_limits: HashMap<String, Arc<Semaphore>>,
    run_time: i64,
    graph_path: PathBuf,
}

impl ProfileCrawler {
    /// Creates a crawler with its frontier seeded from the profile
    pub fn new(
        profile: Arc<Profile>,
        cache: Arc<ContentCache>,
        run_time: i64,
        graph_path: PathBuf,
    ) -> Result<Self, SpindleError> {
        let client = build_http_client()?;
        let current_queue: HashSet<String> =
            profile.seeds.iter().map(|url| url.to_string()).collect();

        Ok(Self {
            profile,
            client,
            cache,
            graph: LinkGraph::new(),
            records: Vec::new(),
            visited: HashSet::new(),
            current_queue,
            next_queue: HashSet::new(),
            host_limits: HashMap::new(),
            run_time,
            graph_path,
        })
    }

    /// Runs exactly `depth` rounds, snapshots the graph, and returns the
    /// record batch
    ///
    /// Per-URL failures never abort the round or the profile; the caller
    /// commits records and flushes cache writes afterwards.
    pub async fn run(mut self) -> CrawlOutput {
        let profile_name = self.profile.name.clone();

        for round in 0..self.profile.depth {
            tracing::debug!(
                "[{}] Round {}: {} URLs queued",
                profile_name,
                round,
                self.current_queue.len()
            );

            // An empty round performs no work; the loop still runs to the
            // depth limit.
            let batch: Vec<String> = self.current_queue.drain().collect();
            let mut fetches = JoinSet::new();

            for url in batch {
                // Entering `visited` at dispatch keeps later rounds from
                // refetching a URL discovered twice concurrently.
                self.visited.insert(url.clone());

                let client = self.client.clone();
                let limit = self.host_limit(&url);
                fetches.spawn(async move {
                    let _permit = limit.acquire_owned().await;
                    let result = fetch_page(&client, &url).await;
                    (url, result)
                });
            }

            // Single collector: all frontier/graph/record mutations happen
            // here, between suspension points.
            while let Some(joined) = fetches.join_next().await {
                match joined {
                    Ok((url, Ok(body))) => self.handle_success(&url, &body),
                    Ok((url, Err(e))) => self.handle_failure(&url, &e),
                    Err(e) => tracing::error!("[{}] Fetch task failed: {}", profile_name, e),
                }
            }

            self.current_queue = &self.next_queue - &self.visited;
            self.next_queue.clear();
        }

        tracing::info!(
            "[{}] Crawled: {} URLs, queue size: {}",
            profile_name,
            self.visited.len(),
            self.current_queue.len()
        );

        self.graph.snapshot(&self.graph_path);

        CrawlOutput {
            profile_name,
            records: self.records,
            visited_count: self.visited.len(),
            leftover_queue: self.current_queue.len(),
        }
    }

    /// Applies a successful fetch: extract, cache, record, graph, queue
    fn handle_success(&mut self, url: &str, body: &str) {
        let base = match Url::parse(url) {
            Ok(base) => base,
            Err(e) => {
                // Queued URLs come from parsed links, so this is unexpected.
                self.handle_failure(url, &FetchError::Other(e.to_string()));
                return;
            }
        };

        let extracted = extract_page(&base, body, &self.profile);

        // Hash is computed synchronously; the disk write is deferred to the
        // orchestrator's flush.
        let hash = self.cache.put(body);

        self.records.push(UrlRecord::success(
            url,
            &self.profile.name,
            self.run_time,
            hash,
            extracted.title.clone(),
        ));

        self.graph.add_page(url, &extracted.title);
        self.graph.add_edges(url, &extracted.links);

        // Edges were already recorded above; the visited filter applies
        // only to the fetch queue, at round transition.
        self.next_queue.extend(extracted.links);
    }

    /// Applies a failed fetch: error node plus sentinel record
    fn handle_failure(&mut self, url: &str, error: &FetchError) {
        tracing::error!("[{}] Error ({}) crawling {}", self.profile.name, error, url);
        self.graph.add_error(url, &error.to_string());
        self.records
            .push(UrlRecord::failure(url, &self.profile.name, self.run_time));
    }

    /// Per-host connection limiter, created on first contact with a host
    fn host_limit(&mut self, url: &str) -> Arc<Semaphore> {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();

        Arc::clone(
            self.host_limits
                .entry(host)
                .or_insert_with(|| Arc::new(Semaphore::new(MAX_HOST_CONNECTIONS))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileEntry;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_profile(seed: &str, depth: u32) -> Arc<Profile> {
        Arc::new(
            Profile::from_entry(&ProfileEntry {
                name: "test".to_string(),
                locations: vec![seed.to_string()],
                depth,
                filter: vec![],
                matches: vec![],
                same_domain: true,
            })
            .unwrap(),
        )
    }

    async fn run_crawler(profile: Arc<Profile>) -> (CrawlOutput, TempDir) {
        let dir = TempDir::new().unwrap();
        let cache_dir = dir.path().join("cache");
        std::fs::create_dir(&cache_dir).unwrap();
        let cache = Arc::new(ContentCache::new(cache_dir));

        let crawler = ProfileCrawler::new(
            profile,
            Arc::clone(&cache),
            1_700_000_000,
            dir.path().join("graph.json"),
        )
        .unwrap();

        let output = crawler.run().await;
        cache.flush().await;
        (output, dir)
    }

    #[tokio::test]
    async fn test_round_count_termination_on_dead_seed() {
        // Nothing listens on port 1; every round after the first is empty,
        // and the crawler must still run to completion without erroring.
        let profile = make_profile("http://127.0.0.1:1/", 3);
        let (output, _dir) = run_crawler(profile).await;

        assert_eq!(output.visited_count, 1);
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.records[0].hash, crate::storage::ERROR_HASH);
    }

    #[tokio::test]
    async fn test_visited_not_refetched_across_rounds() {
        let server = MockServer::start().await;

        // Root links to itself and to /a; /a links back to root.
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><a href="/">home</a><a href="/a">a</a></body></html>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<html><body><a href="/">home</a></body></html>"#),
            )
            .mount(&server)
            .await;

        let profile = make_profile(&format!("{}/", server.uri()), 3);
        let (output, _dir) = run_crawler(profile).await;

        // Root and /a each fetched exactly once despite the cycle.
        assert_eq!(output.visited_count, 2);
        assert_eq!(output.records.len(), 2);
    }

    #[tokio::test]
    async fn test_error_isolation_within_round() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><a href="/ok">ok</a><a href="/broken">broken</a></body></html>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><head><title>OK</title></head></html>"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let profile = make_profile(&format!("{}/", server.uri()), 2);
        let (output, _dir) = run_crawler(profile).await;

        assert_eq!(output.records.len(), 3);

        let broken_url = format!("{}/broken", server.uri());
        let broken = output
            .records
            .iter()
            .find(|r| r.url == broken_url)
            .expect("failed URL still recorded");
        assert_eq!(broken.hash, crate::storage::ERROR_HASH);
        assert_eq!(broken.title, crate::storage::ERROR_TITLE);

        let ok_url = format!("{}/ok", server.uri());
        let ok = output.records.iter().find(|r| r.url == ok_url).unwrap();
        assert_eq!(ok.title, "OK");
        assert!(!ok.hash.is_empty());
    }

    #[tokio::test]
    async fn test_shared_run_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<html><body><a href="/next">n</a></body></html>"#),
            )
            .mount(&server)
            .await;

        let profile = make_profile(&format!("{}/", server.uri()), 2);
        let (output, _dir) = run_crawler(profile).await;

        assert!(output.records.len() >= 2);
        assert!(output.records.iter().all(|r| r.time == 1_700_000_000));
    }
}
