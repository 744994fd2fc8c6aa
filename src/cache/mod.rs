//! Content-addressed page cache
//!
//! Pages are stored compressed under the hex SHA-1 digest of their
//! compressed bytes, giving cross-URL and cross-run deduplication of
//! identical content. The digest is computed synchronously so callers can
//! record it immediately; the file write itself is deferred onto a pending
//! task list that the orchestrator awaits at the end of the run.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use sha1::{Digest, Sha1};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::task::JoinHandle;

/// Content-addressed store shared by all profiles of a run
pub struct ContentCache {
    dir: PathBuf,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl ContentCache {
    /// Creates a cache rooted at `dir`; the directory must already exist
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Compresses and content-addresses a page body
    ///
    /// The digest is computed before returning; the idempotent disk write
    /// is queued and completed later by [`ContentCache::flush`]. Write
    /// failures are logged and never fail the crawl.
    pub fn put(&self, body: &str) -> String {
        let compressed = compress(body);
        let hash = hash_hex(&compressed);

        let dest = self.dir.join(&hash);
        let handle = tokio::spawn(write_entry(dest, compressed));

        self.pending
            .lock()
            .expect("cache pending list poisoned")
            .push(handle);

        hash
    }

    /// Awaits every pending cache write queued so far
    pub async fn flush(&self) {
        let handles = {
            let mut pending = self.pending.lock().expect("cache pending list poisoned");
            std::mem::take(&mut *pending)
        };

        let count = handles.len();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Cache write task panicked: {}", e);
            }
        }
        tracing::debug!("Flushed {} pending cache writes", count);
    }
}

/// Writes one cache entry, skipping digests already present on disk
async fn write_entry(dest: PathBuf, compressed: Vec<u8>) {
    // Concurrent writers of the same digest write identical bytes, so the
    // existence check is an optimization rather than a lock.
    match tokio::fs::try_exists(&dest).await {
        Ok(true) => return,
        Ok(false) => {}
        Err(e) => {
            tracing::warn!("Cache existence check failed for {:?}: {}", dest, e);
        }
    }

    if let Err(e) = tokio::fs::write(&dest, &compressed).await {
        tracing::error!("Failed to write cache entry {:?}: {}", dest, e);
    }
}

/// Zlib-compresses a page body
fn compress(body: &str) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing to a Vec cannot fail.
    encoder
        .write_all(body.as_bytes())
        .and_then(|_| encoder.finish())
        .unwrap_or_default()
}

/// Hex-encoded SHA-1 digest
fn hash_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Reads a cache entry back to its original text (used by tests and
/// downstream consumers)
pub fn read_entry(path: &Path) -> std::io::Result<String> {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    let file = std::fs::File::open(path)?;
    let mut decoder = ZlibDecoder::new(file);
    let mut body = String::new();
    decoder.read_to_string(&mut body)?;
    Ok(body)
}
