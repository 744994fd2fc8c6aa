//! HTTP fetcher
//!
//! Builds the per-profile HTTP client and retrieves raw page text. One
//! logical request per URL, no automatic retry; every failure mode
//! collapses into a [`FetchError`] whose display text labels the graph's
//! error node.

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Per-request timeout; timeouts are ordinary fetch failures
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A single-URL fetch failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timeout")]
    Timeout,

    #[error("connection failed")]
    Connect,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("{0}")]
    Other(String),
}

/// Builds the HTTP client shared by all fetches of one profile
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("spindle/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns the raw page text
///
/// Non-success statuses are failures; the caller records them as error
/// nodes and moves on.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await.map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    response.text().await.map_err(classify)
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect
    } else {
        FetchError::Other(e.to_string())
    }
}
