//! Content extraction strategies
//!
//! Each strategy turns the raw HTML of one fetched page into the content
//! string recorded for that page:
//! - `RawDumpExtractor`: the whole document, encoding-normalized
//! - `ReadabilityExtractor`: the highest-scoring main-content subtree
//! - `SelectorExtractor`: the children of every element matching `tag[.class][#id]`
//!
//! Extraction never fails hard. An empty string means nothing was found;
//! readability mode reports failure with [`NO_SCRAPE`].

mod raw;
mod readability;
mod selector;

pub use raw::RawDumpExtractor;
pub use readability::ReadabilityExtractor;
pub use selector::{SelectorExtractor, SelectorSpec};

use crate::config::CrawlConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Returned by readability mode when no main content could be found
pub const NO_SCRAPE: &str = "No scrape";

/// Content extraction mode selected by the crawl profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentMode {
    RawDump,
    Readability,
    Selector,
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RawDump => "raw-dump",
            Self::Readability => "readability",
            Self::Selector => "selector",
        };
        f.write_str(name)
    }
}

/// Strategy for turning one page's HTML into its content string
///
/// Implementations must be deterministic: the same HTML always yields the
/// same output.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, html: &str) -> String;
}

/// Builds the extractor for the configured content mode
pub fn build_extractor(config: &CrawlConfig) -> Box<dyn ContentExtractor> {
    match config.content_mode {
        ContentMode::RawDump => Box::new(RawDumpExtractor),
        ContentMode::Readability => Box::new(ReadabilityExtractor::new()),
        ContentMode::Selector => Box::new(SelectorExtractor::new(
            &config.selector,
            config.selector_remove_tags.clone(),
        )),
    }
}
