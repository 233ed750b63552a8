//! In-memory batch backend
//!
//! Holds the queue and contexts for the lifetime of the process. Used when
//! batched steps are driven from the same process that enqueued them.

use crate::storage::traits::{
    BatchBackend, BatchContextStore, BatchQueue, StorageError, StorageResult,
};
use crate::storage::{BatchContext, CrawlStep, QueuedStep};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryBatchStore {
    steps: Vec<QueuedStep>,
    runs: BTreeMap<i64, BatchContext>,
    next_run_id: i64,
    next_step_id: i64,
}

impl MemoryBatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, step: CrawlStep) {
        self.next_step_id += 1;
        self.steps.push(QueuedStep {
            id: self.next_step_id,
            step,
        });
    }
}

impl BatchQueue for MemoryBatchStore {
    fn enqueue(&mut self, step: CrawlStep) -> StorageResult<()> {
        self.push(step);
        Ok(())
    }

    fn peek(&self) -> StorageResult<Option<QueuedStep>> {
        Ok(self.steps.last().cloned())
    }

    fn pending(&self, run_id: i64) -> StorageResult<usize> {
        Ok(self.steps.iter().filter(|s| s.step.run_id == run_id).count())
    }

    fn discard(&mut self, run_id: i64) -> StorageResult<usize> {
        let before = self.steps.len();
        self.steps.retain(|s| s.step.run_id != run_id);
        Ok(before - self.steps.len())
    }
}

impl BatchBackend for MemoryBatchStore {
    fn complete_step(
        &mut self,
        step_id: i64,
        children: Vec<CrawlStep>,
        run_id: i64,
        context: &BatchContext,
    ) -> StorageResult<()> {
        // Fail before touching the queue so an error leaves everything as it was
        let Some(slot) = self.runs.get_mut(&run_id) else {
            return Err(StorageError::RunNotFound(run_id));
        };
        *slot = context.clone();

        self.steps.retain(|s| s.id != step_id);
        for child in children {
            self.push(child);
        }
        Ok(())
    }
}

impl BatchContextStore for MemoryBatchStore {
    fn create(&mut self, context: &BatchContext) -> StorageResult<i64> {
        self.next_run_id += 1;
        self.runs.insert(self.next_run_id, context.clone());
        Ok(self.next_run_id)
    }

    fn load(&self, run_id: i64) -> StorageResult<BatchContext> {
        self.runs
            .get(&run_id)
            .cloned()
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn save(&mut self, run_id: i64, context: &BatchContext) -> StorageResult<()> {
        match self.runs.get_mut(&run_id) {
            Some(slot) => {
                *slot = context.clone();
                Ok(())
            }
            None => Err(StorageError::RunNotFound(run_id)),
        }
    }

    fn remove(&mut self, run_id: i64) -> StorageResult<()> {
        self.runs
            .remove(&run_id)
            .map(|_| ())
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn run_ids(&self) -> StorageResult<Vec<i64>> {
        Ok(self.runs.keys().copied().collect())
    }
}
