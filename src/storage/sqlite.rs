//! SQLite batch backend
//!
//! Steps and contexts are stored as JSON documents next to the columns the
//! queue needs to select on, so a run can be enqueued by one process and
//! stepped by another.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{
    BatchBackend, BatchContextStore, BatchQueue, StorageError, StorageResult,
};
use crate::storage::{BatchContext, CrawlStep, QueuedStep};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteBatchStore {
    conn: Connection,
}

impl SqliteBatchStore {
    /// Creates a new SqliteBatchStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteBatchStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn insert_step(conn: &Connection, step: &CrawlStep) -> StorageResult<()> {
    let json = serde_json::to_string(step)?;
    conn.execute(
        "INSERT INTO batch_steps (run_id, url, remaining_depth, settings_hash, step, enqueued_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            step.run_id,
            step.url,
            step.remaining_depth,
            step.settings_hash,
            json,
            Utc::now().to_rfc3339()
        ],
    )?;
    Ok(())
}

fn update_context(conn: &Connection, run_id: i64, context: &BatchContext) -> StorageResult<()> {
    let json = serde_json::to_string(context)?;
    let updated = conn.execute(
        "UPDATE batch_runs SET cancelled = ?1, context = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            context.cancelled,
            json,
            context.updated_at.to_rfc3339(),
            run_id
        ],
    )?;

    if updated == 0 {
        return Err(StorageError::RunNotFound(run_id));
    }
    Ok(())
}

impl BatchQueue for SqliteBatchStore {
    fn enqueue(&mut self, step: CrawlStep) -> StorageResult<()> {
        insert_step(&self.conn, &step)
    }

    fn peek(&self) -> StorageResult<Option<QueuedStep>> {
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, step FROM batch_steps ORDER BY id DESC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((id, json)) => Ok(Some(QueuedStep {
                id,
                step: serde_json::from_str(&json)?,
            })),
            None => Ok(None),
        }
    }

    fn pending(&self, run_id: i64) -> StorageResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM batch_steps WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn discard(&mut self, run_id: i64) -> StorageResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM batch_steps WHERE run_id = ?1", params![run_id])?;
        Ok(removed)
    }
}

impl BatchContextStore for SqliteBatchStore {
    fn create(&mut self, context: &BatchContext) -> StorageResult<i64> {
        let json = serde_json::to_string(context)?;
        self.conn.execute(
            "INSERT INTO batch_runs (seed, settings_hash, cancelled, context, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                context.seed,
                context.settings_hash,
                context.cancelled,
                json,
                context.created_at.to_rfc3339(),
                context.updated_at.to_rfc3339()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn load(&self, run_id: i64) -> StorageResult<BatchContext> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT context FROM batch_runs WHERE id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;

        let json = json.ok_or(StorageError::RunNotFound(run_id))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&mut self, run_id: i64, context: &BatchContext) -> StorageResult<()> {
        update_context(&self.conn, run_id, context)
    }

    fn remove(&mut self, run_id: i64) -> StorageResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM batch_runs WHERE id = ?1", params![run_id])?;

        if removed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn run_ids(&self) -> StorageResult<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM batch_runs ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }
}

impl BatchBackend for SqliteBatchStore {
    fn complete_step(
        &mut self,
        step_id: i64,
        children: Vec<CrawlStep>,
        run_id: i64,
        context: &BatchContext,
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        // Dropping the transaction on an early return rolls everything back
        update_context(&tx, run_id, context)?;
        tx.execute("DELETE FROM batch_steps WHERE id = ?1", params![step_id])?;
        for child in &children {
            insert_step(&tx, child)?;
        }

        tx.commit()?;
        Ok(())
    }
}
