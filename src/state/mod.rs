//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `NodeState`: Lifecycle of one crawl node (pending, fetching, extracted, ...)
//! - `VisitedSet`: URLs already fetched during one run

mod node_state;
mod visited;

pub use node_state::NodeState;
pub use visited::VisitedSet;
