//! Database schema definitions
//!
//! Every profile store shares the same fixed schema; the dynamic
//! table-per-profile layout of earlier designs is replaced by one store
//! file per profile, each holding a single `url_records` table.

/// SQL schema for a per-profile metadata store
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS url_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    profile_name TEXT NOT NULL,
    time INTEGER NOT NULL,
    hash VARCHAR(64) NOT NULL,
    title TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_url_records_hash ON url_records(hash);
CREATE INDEX IF NOT EXISTS idx_url_records_url ON url_records(url);
"#;

/// SQL schema for the process-wide crawl-stats store
pub const STATS_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS crawl_stats (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    time INTEGER NOT NULL
);
"#;

/// Initializes the per-profile schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}

/// Initializes the stats schema
pub fn initialize_stats_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(STATS_SCHEMA_SQL)
}
