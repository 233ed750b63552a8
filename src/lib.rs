//! Depthcrawl: a depth-limited recursive web crawler
//!
//! This crate walks a site from a seed URL, either collecting one extracted
//! content string per page (content crawler) or the filtered list of
//! discovered links (link crawler). Crawls run to completion in one call or
//! as externally scheduled batch steps whose state is persisted between steps.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fields;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Missing capability: {capability}")]
    PermissionDenied { capability: String },

    #[error("No seed URL found in field '{field}'")]
    MissingSeed { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// These indicate a caller mistake and abort the whole crawl.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid selector tag: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{CrawlConfig, CrawlSettings};
pub use crawler::{
    ContentUnit, Coordinator, CrawlFlavor, CrawlReport, ExecutionMode, FetchError, Fetcher,
    HttpFetcher, Traversal,
};
pub use extract::{ContentExtractor, ContentMode, NO_SCRAPE};
pub use state::{NodeState, VisitedSet};
pub use url::{classify_link, LinkCategory, LinkClassification};
