use crate::config::types::{CrawlConfig, CrawlSettings};
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads a crawl profile without compiling it
///
/// # Arguments
///
/// * `path` - Path to the TOML crawl profile
///
/// # Returns
///
/// * `Ok(CrawlSettings)` - Parsed settings, defaults applied
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_settings(path: &Path) -> Result<CrawlSettings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let settings: CrawlSettings = toml::from_str(&content)?;
    Ok(settings)
}

/// Loads, validates and compiles a crawl profile
///
/// # Arguments
///
/// * `path` - Path to the TOML crawl profile
///
/// # Returns
///
/// * `Ok(CrawlConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use depthcrawl::config::load_config;
///
/// let config = load_config(Path::new("crawl.toml")).unwrap();
/// println!("Depth: {}", config.depth);
/// ```
pub fn load_config(path: &Path) -> Result<CrawlConfig, ConfigError> {
    let settings = load_settings(path)?;
    CrawlConfig::from_settings(&settings)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(sha256_hex(content.as_bytes()))
}

/// Computes a SHA-256 hash of a settings snapshot
///
/// The hash covers the canonical JSON form, so two profiles that differ only
/// in formatting or key order hash identically. Batched steps carry this hash
/// to prove they belong to the run they are applied to.
pub fn compute_settings_hash(settings: &CrawlSettings) -> Result<String, ConfigError> {
    let canonical = serde_json::to_string(settings)
        .map_err(|e| ConfigError::Validation(format!("Cannot serialize settings: {}", e)))?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Loads a configuration and returns both the config and its settings hash
pub fn load_config_with_hash(path: &Path) -> Result<(CrawlConfig, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_settings_hash(config.settings())?;
    Ok((config, hash))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
