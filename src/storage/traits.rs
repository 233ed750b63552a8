//! Storage traits and error types
//!
//! This module defines the trait interface for batch backends and
//! associated error types.

use crate::storage::{BatchContext, CrawlStep, QueuedStep};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Run {run_id} was started with settings {expected}, step carries {found}")]
    ConfigMismatch {
        run_id: i64,
        expected: String,
        found: String,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Steppable queue of batched work
///
/// Steps are taken last-in first-out. Pushing a node's children in reverse
/// href order therefore replays the depth-first pre-order of a synchronous
/// crawl.
pub trait BatchQueue {
    fn enqueue(&mut self, step: CrawlStep) -> StorageResult<()>;

    /// Returns the most recently enqueued step without removing it
    ///
    /// A step leaves the queue only through [`BatchBackend::complete_step`],
    /// so a step interrupted mid-fetch is picked up again.
    fn peek(&self) -> StorageResult<Option<QueuedStep>>;

    /// Number of steps still queued for a run
    fn pending(&self, run_id: i64) -> StorageResult<usize>;

    /// Drops every queued step of a run
    ///
    /// # Returns
    ///
    /// The number of steps removed
    fn discard(&mut self, run_id: i64) -> StorageResult<usize>;
}

/// Persistent per-run state of batched crawls
pub trait BatchContextStore {
    /// Stores a new context and assigns its run id
    fn create(&mut self, context: &BatchContext) -> StorageResult<i64>;

    /// Loads a run's context
    ///
    /// # Returns
    ///
    /// * `Ok(BatchContext)` - The stored context
    /// * `Err(StorageError::RunNotFound)` - No such run
    fn load(&self, run_id: i64) -> StorageResult<BatchContext>;

    /// Replaces a run's context
    fn save(&mut self, run_id: i64, context: &BatchContext) -> StorageResult<()>;

    fn remove(&mut self, run_id: i64) -> StorageResult<()>;

    /// Ids of every stored run, oldest first
    fn run_ids(&self) -> StorageResult<Vec<i64>>;
}

/// A backend that provides both the queue and the context store
pub trait BatchBackend: BatchQueue + BatchContextStore {
    /// Finishes a step in one atomic update
    ///
    /// Removes step `step_id`, enqueues `children` in the given order and
    /// replaces the context of `run_id`. On error nothing is changed.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - All three changes were applied
    /// * `Err(StorageError::RunNotFound)` - No such run; the queue is untouched
    fn complete_step(
        &mut self,
        step_id: i64,
        children: Vec<CrawlStep>,
        run_id: i64,
        context: &BatchContext,
    ) -> StorageResult<()>;
}
