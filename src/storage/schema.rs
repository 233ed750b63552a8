//! Database schema definitions
//!
//! This module contains the SQL schema for the batch store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per batched crawl run
CREATE TABLE IF NOT EXISTS batch_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed TEXT NOT NULL,
    settings_hash TEXT NOT NULL,
    cancelled INTEGER NOT NULL DEFAULT 0,
    context TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Queued steps; the highest id is taken first and deleted once completed
CREATE TABLE IF NOT EXISTS batch_steps (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES batch_runs(id) ON DELETE CASCADE,
    url TEXT NOT NULL,
    remaining_depth INTEGER NOT NULL,
    settings_hash TEXT NOT NULL,
    step TEXT NOT NULL,
    enqueued_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_batch_steps_run ON batch_steps(run_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
