//! Crawler module for page fetching and traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - Link extraction and filtering
//! - The politeness cooldown
//! - The depth-first traversal state machine
//! - Synchronous and batched execution

mod coordinator;
mod engine;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, ExecutionMode, RunOutcome, StepReport};
pub use engine::{
    ContentUnit, CrawlFlavor, CrawlNode, CrawlReport, NodeOutcome, RunProgress, Traversal,
};
pub use fetcher::{build_http_client, BasicAuth, FetchError, FetchOptions, Fetcher, HttpFetcher};
pub use parser::{body_scope, scan_hrefs, LinkExtractor};
pub use scheduler::Cooldown;

use crate::config::CrawlConfig;
use crate::storage::MemoryBatchStore;
use crate::Result;

/// Runs a synchronous crawl over HTTP
///
/// Convenience entry point for one-off crawls: builds an [`HttpFetcher`]
/// and runs the traversal to completion.
///
/// # Arguments
///
/// * `config` - The crawl profile
/// * `seed` - Absolute HTTP(S) start URL
/// * `flavor` - Collect page content or links
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished (possibly with no results)
/// * `Err(CrawlError)` - Invalid seed or HTTP client setup failure
pub async fn crawl(config: CrawlConfig, seed: &str, flavor: CrawlFlavor) -> Result<CrawlReport> {
    let fetcher = HttpFetcher::new()?;
    let mut coordinator = Coordinator::new(config, fetcher, MemoryBatchStore::new());
    let outcome = coordinator
        .run(seed, flavor, ExecutionMode::Synchronous)
        .await?;
    Ok(outcome.report)
}
