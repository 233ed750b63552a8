/// Node state definitions for tracking traversal progress
///
/// A node moves `Pending → Fetching → Extracted → ChildrenScheduled`, or ends
/// early in `FetchFailed`, `Terminal` or `Skipped`.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents where a crawl node is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    // ===== Active States =====
    /// Node is scheduled but not yet visited
    Pending,

    /// Node's URL is being fetched
    Fetching,

    /// Page was fetched and its content (if any) recorded
    Extracted,

    // ===== Terminal States =====
    /// Fetch failed; the node and its subtree are dropped
    FetchFailed,

    /// Links were extracted and children scheduled one level deeper
    ChildrenScheduled,

    /// Remaining depth is zero; no links are followed
    Terminal,

    /// URL was already visited in this run, or the run was cancelled
    Skipped,
}

impl NodeState {
    /// Returns true if the node needs no further processing
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Fetching | Self::Extracted)
    }

    /// Returns true if the node's page was fetched successfully
    pub fn was_fetched(&self) -> bool {
        matches!(
            self,
            Self::Extracted | Self::ChildrenScheduled | Self::Terminal
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracted => "extracted",
            Self::FetchFailed => "fetch_failed",
            Self::ChildrenScheduled => "children_scheduled",
            Self::Terminal => "terminal",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
