use crate::config::validation::validate;
use crate::crawler::{BasicAuth, FetchOptions};
use crate::extract::{ContentMode, SelectorSpec};
use crate::url::{parse_word_list, LinkCategory};
use crate::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Path segments excluded from crawling unless the profile overrides them
pub const DEFAULT_EXCLUDE_PAGES: &[&str] = &[
    "privacy",
    "privacy-policy",
    "privacy_policy",
    "terms",
    "terms-of-service",
    "terms_of_service",
    "terms-and-conditions",
    "terms_and_conditions",
    "cookies",
    "cookie-policy",
    "cookie_policy",
    "login",
    "log-in",
    "log_in",
    "signin",
    "sign-in",
    "sign_in",
    "register",
    "signup",
    "sign-up",
    "sign_up",
];

/// Serializable crawl profile, as written in TOML
///
/// Every section and key is optional; missing values take the defaults below.
/// A snapshot of this structure travels with every batched crawl step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    pub crawl: TraversalSettings,
    pub content: ContentSettings,
    pub request: RequestSettings,
}

/// Traversal and link filtering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalSettings {
    /// Number of link-following hops from the seed (0 = seed only)
    pub depth: u32,

    /// Only follow links on the seed's host
    #[serde(rename = "host-only")]
    pub host_only: bool,

    /// Only discover links inside `<body>...</body>`
    #[serde(rename = "body-only")]
    pub body_only: bool,

    /// Include the seed URL in link crawl results
    #[serde(rename = "include-source-url")]
    pub include_source_url: bool,

    /// Comma or newline separated path segments never to follow
    #[serde(rename = "exclude-pages")]
    pub exclude_pages: String,

    /// Regex a link must match to be followed
    #[serde(rename = "include-pattern")]
    pub include_pattern: Option<String>,

    /// Regex a link must not match to be followed
    #[serde(rename = "exclude-pattern")]
    pub exclude_pattern: Option<String>,

    /// Link categories to follow
    #[serde(rename = "types-to-scrape")]
    pub types_to_scrape: Vec<LinkCategory>,

    /// Delay between successive fetches (milliseconds)
    #[serde(rename = "cool-down-ms")]
    pub cool_down_ms: u64,
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self {
            depth: 1,
            host_only: true,
            body_only: true,
            include_source_url: false,
            exclude_pages: DEFAULT_EXCLUDE_PAGES.join("\n"),
            include_pattern: None,
            exclude_pattern: None,
            types_to_scrape: vec![LinkCategory::Webpages],
            cool_down_ms: 500,
        }
    }
}

/// Content extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// Extraction strategy
    pub mode: ContentMode,

    /// Prefix every content unit with its source URL
    #[serde(rename = "url-on-top")]
    pub url_on_top: bool,

    /// `tag[.class][#id]` used in selector mode
    #[serde(rename = "selector-tag")]
    pub selector_tag: String,

    /// Tags removed before selection, one per line
    #[serde(rename = "selector-remove-tags")]
    pub selector_remove_tags: String,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            mode: ContentMode::Readability,
            url_on_top: false,
            selector_tag: "body".to_string(),
            selector_remove_tags: "script\nstyle".to_string(),
        }
    }
}

/// HTTP request settings handed to the fetcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSettings {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "basic-auth")]
    pub basic_auth: Option<BasicAuthSettings>,

    pub headers: BTreeMap<String, String>,

    pub cookies: BTreeMap<String, String>,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("depthcrawl/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            basic_auth: None,
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
        }
    }
}

/// Basic-auth credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicAuthSettings {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Validated, compiled configuration for one crawl run
///
/// Owned by the caller and borrowed read-only by the traversal.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub depth: u32,
    pub host_only: bool,
    pub body_only: bool,
    pub include_source_url: bool,
    pub url_on_top: bool,
    pub exclude_pages: HashSet<String>,
    pub include_pattern: Option<Regex>,
    pub exclude_pattern: Option<Regex>,
    pub types_to_scrape: HashSet<LinkCategory>,
    pub cool_down: Duration,
    pub content_mode: ContentMode,
    pub selector: SelectorSpec,
    pub selector_remove_tags: Vec<String>,
    pub fetch_options: FetchOptions,
    settings: CrawlSettings,
}

impl CrawlConfig {
    /// Validates settings and compiles patterns and the selector
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlConfig)` - Ready-to-use configuration
    /// * `Err(ConfigError)` - Invalid pattern, selector or value
    pub fn from_settings(settings: &CrawlSettings) -> Result<Self, ConfigError> {
        validate(settings)?;

        let crawl = &settings.crawl;
        let content = &settings.content;
        let request = &settings.request;

        let include_pattern = compile_pattern(crawl.include_pattern.as_deref())?;
        let exclude_pattern = compile_pattern(crawl.exclude_pattern.as_deref())?;

        // Selector mode is the only consumer of the selector; other modes keep the default
        let selector = match content.mode {
            ContentMode::Selector => SelectorSpec::parse(&content.selector_tag)?,
            _ => SelectorSpec::parse(&content.selector_tag).unwrap_or_default(),
        };

        let selector_remove_tags = content
            .selector_remove_tags
            .lines()
            .map(|line| line.trim().to_ascii_lowercase())
            .filter(|line| !line.is_empty())
            .collect();

        let fetch_options = FetchOptions {
            user_agent: request.user_agent.clone(),
            timeout: Duration::from_secs(request.timeout_secs),
            basic_auth: request.basic_auth.as_ref().map(|auth| BasicAuth {
                username: auth.username.clone(),
                password: auth.password.clone(),
            }),
            headers: request.headers.clone(),
            cookies: request.cookies.clone(),
        };

        Ok(Self {
            depth: crawl.depth,
            host_only: crawl.host_only,
            body_only: crawl.body_only,
            include_source_url: crawl.include_source_url,
            url_on_top: content.url_on_top,
            exclude_pages: parse_word_list(&crawl.exclude_pages).into_iter().collect(),
            include_pattern,
            exclude_pattern,
            types_to_scrape: crawl.types_to_scrape.iter().copied().collect(),
            cool_down: Duration::from_millis(crawl.cool_down_ms),
            content_mode: content.mode,
            selector,
            selector_remove_tags,
            fetch_options,
            settings: settings.clone(),
        })
    }

    /// The settings this configuration was compiled from
    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }
}

fn compile_pattern(pattern: Option<&str>) -> Result<Option<Regex>, ConfigError> {
    match pattern.map(str::trim) {
        None | Some("") => Ok(None),
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", p, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_compile() {
        let config = CrawlConfig::from_settings(&CrawlSettings::default()).unwrap();

        assert_eq!(config.depth, 1);
        assert!(config.host_only);
        assert!(config.body_only);
        assert!(!config.url_on_top);
        assert!(config.exclude_pages.contains("login"));
        assert!(config.exclude_pages.contains("privacy_policy"));
        assert_eq!(config.types_to_scrape.len(), 1);
        assert!(config.types_to_scrape.contains(&LinkCategory::Webpages));
        assert_eq!(config.cool_down, Duration::from_millis(500));
        assert_eq!(config.selector_remove_tags, vec!["script", "style"]);
    }

    #[test]
    fn test_empty_pattern_is_no_constraint() {
        let mut settings = CrawlSettings::default();
        settings.crawl.include_pattern = Some("  ".to_string());
        let config = CrawlConfig::from_settings(&settings).unwrap();
        assert!(config.include_pattern.is_none());
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let mut settings = CrawlSettings::default();
        settings.crawl.exclude_pattern = Some("([unclosed".to_string());
        let result = CrawlConfig::from_settings(&settings);
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_invalid_selector_only_fatal_in_selector_mode() {
        let mut settings = CrawlSettings::default();
        settings.content.selector_tag = "div..x".to_string();
        assert!(CrawlConfig::from_settings(&settings).is_ok());

        settings.content.mode = ContentMode::Selector;
        let result = CrawlConfig::from_settings(&settings);
        assert!(matches!(result, Err(ConfigError::InvalidSelector(_))));
    }

    #[test]
    fn test_settings_snapshot_kept() {
        let mut settings = CrawlSettings::default();
        settings.crawl.depth = 4;
        let config = CrawlConfig::from_settings(&settings).unwrap();
        assert_eq!(config.settings(), &settings);
    }
}
