//! Storage module for batched crawl runs
//!
//! A batched run is split into steps that may execute in different process
//! invocations, so everything a step needs lives here rather than in memory:
//! - The step queue (LIFO, so steps come back out in depth-first pre-order)
//! - One context per run: visited set, fetch count, accumulated report
//! - The settings snapshot and its hash, carried by every step
//!
//! Two backends share the same traits: [`MemoryBatchStore`] for single
//! process use and tests, [`SqliteBatchStore`] for runs spanning processes.

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryBatchStore;
pub use sqlite::SqliteBatchStore;
pub use traits::{BatchBackend, BatchContextStore, BatchQueue, StorageError, StorageResult};

use crate::config::CrawlSettings;
use crate::crawler::{CrawlFlavor, CrawlNode, CrawlReport, RunProgress};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::path::Path;

/// Opens (or creates) the SQLite batch store at `path`
///
/// # Returns
///
/// * `Ok(SqliteBatchStore)` - Ready store with schema applied
/// * `Err(StorageError)` - Failed to open the database
pub fn open_batch_store(path: &Path) -> StorageResult<SqliteBatchStore> {
    SqliteBatchStore::new(path)
}

/// One unit of batched work: visit a single node of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlStep {
    pub run_id: i64,
    pub url: String,
    pub remaining_depth: u32,
    pub flavor: CrawlFlavor,
    /// Settings the run was started with
    pub settings: CrawlSettings,
    pub settings_hash: String,
}

impl CrawlStep {
    pub fn node(&self) -> CrawlNode {
        CrawlNode::new(self.url.clone(), self.remaining_depth)
    }

    /// Builds the step for a child node of this step's run
    pub fn child(&self, node: CrawlNode) -> Self {
        Self {
            run_id: self.run_id,
            url: node.url,
            remaining_depth: node.remaining_depth,
            flavor: self.flavor,
            settings: self.settings.clone(),
            settings_hash: self.settings_hash.clone(),
        }
    }
}

/// A step as stored in a queue, with its queue id
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedStep {
    pub id: i64,
    pub step: CrawlStep,
}

/// Everything a batched run accumulates between steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchContext {
    pub seed: String,
    pub flavor: CrawlFlavor,
    pub settings_hash: String,
    pub progress: RunProgress,
    pub report: CrawlReport,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BatchContext {
    pub fn new(seed: &str, flavor: CrawlFlavor, settings_hash: &str) -> Self {
        let now = Utc::now();
        Self {
            seed: seed.to_string(),
            flavor,
            settings_hash: settings_hash.to_string(),
            progress: RunProgress::default(),
            report: CrawlReport::default(),
            cancelled: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
