//! Depth-first traversal engine
//!
//! Every node goes through the same step, [`Traversal::visit`]:
//!
//! 1. Claim the URL in the visited set, or discard the node if it was claimed
//! 2. Wait out the cooldown and fetch the page
//! 3. Extract the page content (content crawler)
//! 4. Unless the remaining depth is zero, extract links from the body-scoped
//!    HTML and schedule them one level deeper, in href order
//!
//! A synchronous run drives that step from an explicit LIFO stack with
//! children pushed in reverse, which yields the same parent-before-children,
//! siblings-in-href-order sequence as a recursive walk. Batched runs drive
//! the same step from a persisted queue.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::LinkExtractor;
use crate::crawler::scheduler::Cooldown;
use crate::extract::{build_extractor, ContentExtractor};
use crate::state::{NodeState, VisitedSet};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use url::Url;

/// What a crawl run accumulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlFlavor {
    /// One extracted content string per fetched page
    Content,
    /// The filtered, deduplicated list of visited URLs
    Links,
}

/// One URL waiting to be visited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlNode {
    pub url: String,
    pub remaining_depth: u32,
}

impl CrawlNode {
    pub fn new(url: impl Into<String>, remaining_depth: u32) -> Self {
        Self {
            url: url.into(),
            remaining_depth,
        }
    }
}

/// One page's contribution to a content crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUnit {
    pub source_url: String,
    pub text: String,
}

/// Accumulated result of a crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Content units in traversal order (content crawler)
    pub contents: Vec<ContentUnit>,
    /// Visited URLs in traversal order (link crawler)
    pub links: Vec<String>,
    pub pages_fetched: u64,
    pub fetch_failures: u64,
    pub cancelled: bool,
    /// A batch step could not be executed; its subtree is missing
    #[serde(default)]
    pub incomplete: bool,
}

impl CrawlReport {
    /// Folds one node outcome into the report
    pub fn record(&mut self, outcome: &NodeOutcome) {
        if let Some(unit) = &outcome.content {
            self.contents.push(unit.clone());
        }
        if let Some(link) = &outcome.link {
            self.links.push(link.clone());
        }
        if outcome.state == NodeState::FetchFailed {
            self.fetch_failures += 1;
        } else if outcome.state.was_fetched() && outcome.fetched {
            self.pages_fetched += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty() && self.links.is_empty()
    }
}

/// Per-run mutable state shared by every step of the run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProgress {
    pub visited: VisitedSet,
    /// Fetches issued so far; drives the cooldown
    pub fetch_count: u64,
}

/// Result of visiting one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutcome {
    pub url: String,
    pub state: NodeState,
    /// Whether an HTTP request was issued for this node
    pub fetched: bool,
    pub content: Option<ContentUnit>,
    pub link: Option<String>,
    /// Children in href order, each one level shallower
    pub children: Vec<CrawlNode>,
}

impl NodeOutcome {
    fn new(url: &str, state: NodeState) -> Self {
        Self {
            url: url.to_string(),
            state,
            fetched: false,
            content: None,
            link: None,
            children: Vec::new(),
        }
    }
}

/// Drives the per-node state machine for one crawl profile
pub struct Traversal<'a, F: Fetcher> {
    config: &'a CrawlConfig,
    fetcher: &'a F,
    extractor: Box<dyn ContentExtractor>,
    cooldown: Cooldown,
}

impl<'a, F: Fetcher> Traversal<'a, F> {
    pub fn new(config: &'a CrawlConfig, fetcher: &'a F) -> Self {
        Self {
            config,
            fetcher,
            extractor: build_extractor(config),
            cooldown: Cooldown::new(config.cool_down),
        }
    }

    /// Runs a whole crawl to completion
    ///
    /// # Arguments
    ///
    /// * `seed` - Start URL, visited with the configured depth
    /// * `flavor` - Whether to collect content or links
    /// * `cancel` - Checked before every node; a cancelled run returns what it
    ///   has collected so far with `cancelled` set
    ///
    /// # Returns
    ///
    /// The accumulated report. Fetch failures are counted, never raised.
    pub async fn run(
        &self,
        seed: &Url,
        flavor: CrawlFlavor,
        cancel: &CancellationToken,
    ) -> CrawlReport {
        tracing::info!(
            "Starting {:?} crawl of {} (depth {}, mode {})",
            flavor,
            seed,
            self.config.depth,
            self.config.content_mode
        );

        let mut report = CrawlReport::default();
        let mut progress = RunProgress::default();
        let mut stack = vec![CrawlNode::new(seed.as_str(), self.config.depth)];

        while let Some(node) = stack.pop() {
            if cancel.is_cancelled() {
                tracing::info!("Crawl of {} cancelled with {} nodes pending", seed, stack.len() + 1);
                report.cancelled = true;
                break;
            }

            let outcome = self.visit(seed, flavor, &node, &mut progress).await;
            report.record(&outcome);
            stack.extend(outcome.children.into_iter().rev());
        }

        tracing::info!(
            "Crawl of {} finished: {} pages fetched, {} failures, {} contents, {} links",
            seed,
            report.pages_fetched,
            report.fetch_failures,
            report.contents.len(),
            report.links.len()
        );

        report
    }

    /// Executes the state machine for a single node
    ///
    /// This is the unit of work of a batched run; the caller is responsible
    /// for scheduling `children` and persisting `progress`.
    pub async fn visit(
        &self,
        seed: &Url,
        flavor: CrawlFlavor,
        node: &CrawlNode,
        progress: &mut RunProgress,
    ) -> NodeOutcome {
        if !progress.visited.insert(&node.url) {
            tracing::trace!("{} already visited", node.url);
            return NodeOutcome::new(&node.url, NodeState::Skipped);
        }

        let mut outcome = NodeOutcome::new(&node.url, NodeState::Pending);

        if flavor == CrawlFlavor::Links {
            let is_seed = node.url == seed.as_str();
            if !is_seed || self.config.include_source_url {
                outcome.link = Some(node.url.clone());
            }
            // A leaf contributes only its URL, so there is nothing to fetch
            if node.remaining_depth == 0 {
                outcome.state = NodeState::Terminal;
                return outcome;
            }
        }

        let page_url = match Url::parse(&node.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping unparsable URL {}: {}", node.url, e);
                outcome.state = NodeState::FetchFailed;
                return outcome;
            }
        };

        outcome.state = NodeState::Fetching;
        self.cooldown.wait(progress.fetch_count).await;
        progress.fetch_count += 1;
        outcome.fetched = true;

        tracing::debug!("Fetching {} (remaining depth {})", node.url, node.remaining_depth);
        let html = match self
            .fetcher
            .fetch(&node.url, &self.config.fetch_options)
            .await
        {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Fetch failed: {}", e);
                outcome.state = NodeState::FetchFailed;
                return outcome;
            }
        };

        if flavor == CrawlFlavor::Content {
            let text = self.extractor.extract(&html);
            if !text.is_empty() {
                let text = if self.config.url_on_top {
                    format!("Source: {}<br>\n{}", node.url, text)
                } else {
                    text
                };
                outcome.content = Some(ContentUnit {
                    source_url: node.url.clone(),
                    text,
                });
            }
        }
        outcome.state = NodeState::Extracted;

        if node.remaining_depth == 0 {
            outcome.state = NodeState::Terminal;
            return outcome;
        }

        let extractor = LinkExtractor::new(self.config, seed);
        outcome.children = extractor
            .extract(&html, &page_url)
            .into_iter()
            .filter(|link| !progress.visited.contains(link))
            .map(|link| CrawlNode::new(link, node.remaining_depth - 1))
            .collect();

        tracing::debug!("{}: scheduled {} children", node.url, outcome.children.len());
        outcome.state = NodeState::ChildrenScheduled;
        outcome
    }
}
