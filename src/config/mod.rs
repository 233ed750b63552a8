//! Configuration module for crawl profiles
//!
//! This module handles loading, parsing, and validating TOML crawl profiles,
//! and compiling them into the immutable [`CrawlConfig`] a traversal runs with.
//!
//! # Example
//!
//! ```no_run
//! use depthcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will follow links {} hops deep", config.depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BasicAuthSettings, ContentSettings, CrawlConfig, CrawlSettings, RequestSettings,
    TraversalSettings, DEFAULT_EXCLUDE_PAGES,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, compute_settings_hash, load_config, load_config_with_hash,
    load_settings,
};
