//! Crawl coordinator: synchronous and batched execution
//!
//! A synchronous run drives the traversal to completion in the caller's
//! task. A batched run only records a context and enqueues the seed step;
//! an external driver then calls [`Coordinator::process_step`] until the
//! queue is drained and collects the report with [`Coordinator::collect`].
//! Each step rebuilds its configuration from the settings snapshot it
//! carries, so steps can execute in a different process than the one that
//! started the run.

use crate::config::{compute_settings_hash, CrawlConfig};
use crate::crawler::engine::{CrawlFlavor, CrawlReport, Traversal};
use crate::crawler::fetcher::Fetcher;
use crate::state::NodeState;
use crate::storage::{BatchBackend, BatchContext, CrawlStep, QueuedStep, StorageError};
use crate::url::parse_seed;
use crate::Result;
use std::fmt;
use tokio_util::sync::CancellationToken;
use url::Url;

/// How a crawl is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Run to completion before returning
    Synchronous,
    /// Enqueue the seed and return immediately
    Batched,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synchronous => f.write_str("synchronous"),
            Self::Batched => f.write_str("batched"),
        }
    }
}

/// Result of starting a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Full report for synchronous runs, empty for deferred ones
    pub report: CrawlReport,
    /// True when the work was handed to the batch queue
    pub deferred: bool,
    /// Batch run id, set for deferred runs
    pub run_id: Option<i64>,
}

/// What one batch step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub run_id: i64,
    pub url: String,
    pub state: NodeState,
    /// Children enqueued by this step
    pub scheduled: usize,
    /// Steps of the run still queued after this one
    pub remaining: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator<F: Fetcher, B: BatchBackend> {
    config: CrawlConfig,
    fetcher: F,
    backend: B,
    cancel: CancellationToken,
}

impl<F: Fetcher, B: BatchBackend> Coordinator<F, B> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - Profile used for runs started through this coordinator
    /// * `fetcher` - Transport for every fetch
    /// * `backend` - Queue and context store for batched runs
    pub fn new(config: CrawlConfig, fetcher: F, backend: B) -> Self {
        Self {
            config,
            fetcher,
            backend,
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Token that stops synchronous runs and step processing
    ///
    /// Cancelling takes effect before the next fetch; the visited set and
    /// any persisted context stay consistent.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Starts a crawl from `seed`
    ///
    /// # Returns
    ///
    /// * `Ok(RunOutcome)` - Report (synchronous) or run id (batched)
    /// * `Err(CrawlError)` - Invalid seed, settings or storage failure
    pub async fn run(
        &mut self,
        seed: &str,
        flavor: CrawlFlavor,
        mode: ExecutionMode,
    ) -> Result<RunOutcome> {
        let seed = parse_seed(seed)?;

        match mode {
            ExecutionMode::Synchronous => {
                let traversal = Traversal::new(&self.config, &self.fetcher);
                let report = traversal.run(&seed, flavor, &self.cancel).await;
                Ok(RunOutcome {
                    report,
                    deferred: false,
                    run_id: None,
                })
            }
            ExecutionMode::Batched => {
                let run_id = self.enqueue(&seed, flavor)?;
                Ok(RunOutcome {
                    report: CrawlReport::default(),
                    deferred: true,
                    run_id: Some(run_id),
                })
            }
        }
    }

    /// Creates a batch run and enqueues its seed step
    ///
    /// # Returns
    ///
    /// The id of the new run
    pub fn enqueue(&mut self, seed: &Url, flavor: CrawlFlavor) -> Result<i64> {
        let settings = self.config.settings().clone();
        let settings_hash = compute_settings_hash(&settings)?;

        let context = BatchContext::new(seed.as_str(), flavor, &settings_hash);
        let run_id = self.backend.create(&context)?;

        self.backend.enqueue(CrawlStep {
            run_id,
            url: seed.to_string(),
            remaining_depth: self.config.depth,
            flavor,
            settings,
            settings_hash,
        })?;

        tracing::info!("Enqueued batch run {} for {} ({:?})", run_id, seed, flavor);
        Ok(run_id)
    }

    /// Executes the next queued step, if any
    ///
    /// The step's node is visited with the run's persisted visited set and
    /// fetch count; its children go back on the queue in reverse order so
    /// the queue replays depth-first pre-order. The step stays queued until
    /// the backend removes it together with saving the context and
    /// enqueuing the children, so an interrupted step runs again.
    ///
    /// A step that cannot be executed is dropped and its run is marked
    /// `incomplete`, so the queue never stalls on it.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(StepReport))` - A step was processed (or discarded)
    /// * `Ok(None)` - Queue empty, or processing was cancelled
    /// * `Err(CrawlError)` - Storage failure, or an abandoned step
    ///   (settings snapshot mismatch, unusable settings)
    pub async fn process_step(&mut self) -> Result<Option<StepReport>> {
        if self.cancel.is_cancelled() {
            return Ok(None);
        }

        let Some(QueuedStep { id: step_id, step }) = self.backend.peek()? else {
            return Ok(None);
        };
        let run_id = step.run_id;

        let mut context = match self.backend.load(run_id) {
            Ok(context) => context,
            Err(StorageError::RunNotFound(_)) => {
                let dropped = self.backend.discard(run_id)?;
                tracing::warn!("Dropped {} steps of unknown run {}", dropped, run_id);
                return Ok(Some(StepReport {
                    run_id,
                    url: step.url,
                    state: NodeState::Skipped,
                    scheduled: 0,
                    remaining: 0,
                }));
            }
            Err(e) => return Err(e.into()),
        };

        if context.cancelled {
            let dropped = self.backend.discard(run_id)?;
            tracing::info!("Run {} is cancelled; discarded {} queued steps", run_id, dropped);
            context.report.cancelled = true;
            context.touch();
            self.backend.save(run_id, &context)?;
            return Ok(Some(StepReport {
                run_id,
                url: step.url,
                state: NodeState::Skipped,
                scheduled: 0,
                remaining: 0,
            }));
        }

        let (config, seed) = match prepare_step(&step, &context) {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::error!("Abandoning step {} of run {} ({}): {}", step_id, run_id, step.url, e);
                context.report.incomplete = true;
                context.touch();
                self.backend.complete_step(step_id, Vec::new(), run_id, &context)?;
                return Err(e);
            }
        };
        let traversal = Traversal::new(&config, &self.fetcher);

        let outcome = traversal
            .visit(&seed, context.flavor, &step.node(), &mut context.progress)
            .await;
        context.report.record(&outcome);

        let scheduled = outcome.children.len();
        let children: Vec<CrawlStep> = outcome
            .children
            .into_iter()
            .rev()
            .map(|child| step.child(child))
            .collect();

        context.touch();
        self.backend.complete_step(step_id, children, run_id, &context)?;

        let remaining = self.backend.pending(run_id)?;
        if remaining == 0 {
            tracing::info!(
                "Batch run {} drained: {} pages fetched, {} failures",
                run_id,
                context.report.pages_fetched,
                context.report.fetch_failures
            );
        }

        Ok(Some(StepReport {
            run_id,
            url: outcome.url,
            state: outcome.state,
            scheduled,
            remaining,
        }))
    }

    /// Processes queued steps until the queue is empty or `limit` is reached
    ///
    /// # Returns
    ///
    /// The number of steps processed
    pub async fn run_pending(&mut self, limit: Option<usize>) -> Result<usize> {
        let mut processed = 0;
        while limit.map_or(true, |max| processed < max) {
            if self.process_step().await?.is_none() {
                break;
            }
            processed += 1;
        }
        Ok(processed)
    }

    /// Returns the report of a finished batch run and forgets the run
    ///
    /// # Returns
    ///
    /// * `Ok(Some(CrawlReport))` - The run had no queued steps left
    /// * `Ok(None)` - Steps are still queued; nothing was removed
    /// * `Err(CrawlError)` - Unknown run or storage failure
    pub fn collect(&mut self, run_id: i64) -> Result<Option<CrawlReport>> {
        if self.backend.pending(run_id)? > 0 {
            return Ok(None);
        }

        let context = self.backend.load(run_id)?;
        self.backend.remove(run_id)?;
        Ok(Some(context.report))
    }

    /// Marks a batch run cancelled and drops its queued steps
    ///
    /// The accumulated partial report remains collectable.
    ///
    /// # Returns
    ///
    /// The number of queued steps discarded
    pub fn cancel_run(&mut self, run_id: i64) -> Result<usize> {
        let mut context = self.backend.load(run_id)?;
        context.cancelled = true;
        context.report.cancelled = true;
        context.touch();
        self.backend.save(run_id, &context)?;

        let dropped = self.backend.discard(run_id)?;
        tracing::info!("Cancelled batch run {} ({} steps discarded)", run_id, dropped);
        Ok(dropped)
    }
}

/// Rebuilds the configuration a step runs with
///
/// The step's settings snapshot must hash to the value recorded when the
/// run was created.
fn prepare_step(step: &CrawlStep, context: &BatchContext) -> Result<(CrawlConfig, Url)> {
    let found = compute_settings_hash(&step.settings)?;
    if found != context.settings_hash || step.settings_hash != context.settings_hash {
        return Err(StorageError::ConfigMismatch {
            run_id: step.run_id,
            expected: context.settings_hash.clone(),
            found,
        }
        .into());
    }

    let config = CrawlConfig::from_settings(&step.settings)?;
    let seed = Url::parse(&context.seed)?;
    Ok((config, seed))
}
