//! SQLite-backed metadata and stats stores

use crate::storage::schema::{initialize_schema, initialize_stats_schema};
use crate::storage::UrlRecord;
use rusqlite::{params, Connection};
use std::path::Path;

/// Performance pragmas applied at open; tuning only, not correctness
const PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA busy_timeout = 5000;
    PRAGMA synchronous = NORMAL;
    PRAGMA cache_size = -65536;
    PRAGMA foreign_keys = ON;
    PRAGMA temp_store = MEMORY;
";

/// Append-only per-profile metadata store
pub struct MetadataStore {
    conn: Connection,
}

impl MetadataStore {
    /// Opens (or creates) the store file and ensures the schema exists
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        apply_pragmas(&conn);
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory store for tests
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Commits a record batch in a single transaction
    pub fn commit_batch(&mut self, records: &[UrlRecord]) -> Result<(), rusqlite::Error> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO url_records (url, profile_name, time, hash, title)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.url,
                    record.profile_name,
                    record.time,
                    record.hash,
                    record.title
                ])?;
            }
        }
        tx.commit()
    }

    /// Number of rows committed so far
    pub fn count_records(&self) -> Result<u64, rusqlite::Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM url_records", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Distinct content hashes, the indexer's work list
    pub fn distinct_hashes(&self) -> Result<Vec<String>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT hash FROM url_records ORDER BY hash")?;
        let hashes = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(hashes)
    }
}

/// Process-wide crawl statistics store
pub struct StatsStore {
    conn: Connection,
}

impl StatsStore {
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        apply_pragmas(&conn);
        initialize_stats_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        initialize_stats_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Records one completed run
    pub fn record_run(&mut self, time: i64) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("INSERT INTO crawl_stats (time) VALUES (?1)", params![time])?;
        Ok(())
    }

    pub fn count_runs(&self) -> Result<u64, rusqlite::Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM crawl_stats", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Applies tuning pragmas; failures are logged, never fatal
fn apply_pragmas(conn: &Connection) {
    if let Err(e) = conn.execute_batch(PRAGMAS) {
        tracing::warn!("Failed to apply store pragmas: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ERROR_HASH, ERROR_TITLE};

    fn record(url: &str, hash: &str, title: &str) -> UrlRecord {
        UrlRecord {
            url: url.to_string(),
            profile_name: "test".to_string(),
            time: 1_700_000_000,
            hash: hash.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_open_in_memory() {
        assert!(MetadataStore::open_in_memory().is_ok());
    }

    #[test]
    fn test_commit_batch() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        let records = vec![
            record("https://a/", "abc123", "Page A"),
            record("https://b/", "def456", "Page B"),
        ];

        store.commit_batch(&records).unwrap();
        assert_eq!(store.count_records().unwrap(), 2);
    }

    #[test]
    fn test_commit_empty_batch() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        store.commit_batch(&[]).unwrap();
        assert_eq!(store.count_records().unwrap(), 0);
    }

    #[test]
    fn test_sentinel_record_round_trips() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        store
            .commit_batch(&[record("https://broken/", ERROR_HASH, ERROR_TITLE)])
            .unwrap();
        assert_eq!(store.count_records().unwrap(), 1);
    }

    #[test]
    fn test_distinct_hashes_deduplicate() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        store
            .commit_batch(&[
                record("https://a/", "same", "A"),
                record("https://b/", "same", "B"),
                record("https://c/", "other", "C"),
            ])
            .unwrap();

        let hashes = store.distinct_hashes().unwrap();
        assert_eq!(hashes, vec!["other".to_string(), "same".to_string()]);
    }

    #[test]
    fn test_stats_store_records_runs() {
        let mut stats = StatsStore::open_in_memory().unwrap();
        stats.record_run(1_700_000_000).unwrap();
        stats.record_run(1_700_000_100).unwrap();
        assert_eq!(stats.count_runs().unwrap(), 2);
    }

    #[test]
    fn test_pragmas_on_file_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = MetadataStore::open(&dir.path().join("test.db")).unwrap();
        assert_eq!(store.count_records().unwrap(), 0);
    }
}
