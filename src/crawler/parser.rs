//! Link extraction and filtering
//!
//! Links are found with a permissive scan of `href=` attributes rather than a
//! DOM walk, so malformed markup never hides a link. Every candidate then
//! goes through the same pipeline:
//!
//! 1. Resolve against the page URL (drops fragments, special schemes, junk)
//! 2. Same-host check against the seed (when `host_only` is set)
//! 3. Excluded path segments
//! 4. Include / exclude patterns
//! 5. Link category filter
//! 6. Stable deduplication

use crate::config::CrawlConfig;
use crate::url::{classify_link, has_excluded_segment, resolve_href, same_host, LinkCategory};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

fn href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'<>`]+))"#)
            .unwrap_or_else(|_| unreachable!("href pattern is a valid literal"))
    })
}

/// Returns every raw `href` value in document order
///
/// Double-quoted, single-quoted and bare attribute values are recognized.
pub fn scan_hrefs(html: &str) -> Vec<&str> {
    href_pattern()
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str())
        .collect()
}

/// Narrows a document to the content of its `<body>` element
///
/// Falls back to the whole document when there is no `<body>` tag. The search
/// is case-insensitive; a missing `</body>` extends the scope to the end.
pub fn body_scope(html: &str) -> &str {
    let lowered = html.to_ascii_lowercase();

    let Some(open) = lowered.find("<body") else {
        return html;
    };
    let start = lowered[open..]
        .find('>')
        .map(|gt| open + gt + 1)
        .unwrap_or(html.len());
    let end = lowered
        .rfind("</body")
        .filter(|&end| end >= start)
        .unwrap_or(html.len());

    &html[start..end]
}

/// Extracts the followable links of a page according to a crawl profile
pub struct LinkExtractor<'a> {
    config: &'a CrawlConfig,
    seed: Url,
}

impl<'a> LinkExtractor<'a> {
    pub fn new(config: &'a CrawlConfig, seed: &Url) -> Self {
        Self {
            config,
            seed: seed.clone(),
        }
    }

    /// Extracts, resolves and filters the links of one page
    ///
    /// # Arguments
    ///
    /// * `html` - Raw page markup; scoped to `<body>` when `body_only` is set
    /// * `page_url` - URL the page was fetched from, used to resolve relative links
    ///
    /// # Returns
    ///
    /// Absolute URLs in first-occurrence order, without duplicates
    pub fn extract(&self, html: &str, page_url: &Url) -> Vec<String> {
        let scope = if self.config.body_only {
            body_scope(html)
        } else {
            html
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for href in scan_hrefs(scope) {
            let Some(url) = resolve_href(href, page_url) else {
                tracing::trace!("dropping unresolvable href '{}'", href);
                continue;
            };

            if !self.accepts(&url) {
                continue;
            }

            let url = url.to_string();
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }

        links
    }

    /// Applies the host, exclusion, pattern and category filters
    pub fn accepts(&self, url: &Url) -> bool {
        let config = self.config;

        if config.host_only && !same_host(url, &self.seed) {
            tracing::trace!("{} rejected: different host", url);
            return false;
        }

        if has_excluded_segment(url, &config.exclude_pages) {
            tracing::trace!("{} rejected: excluded page", url);
            return false;
        }

        let as_str = url.as_str();
        if let Some(include) = &config.include_pattern {
            if !include.is_match(as_str) {
                tracing::trace!("{} rejected: does not match include pattern", url);
                return false;
            }
        }
        if let Some(exclude) = &config.exclude_pattern {
            if exclude.is_match(as_str) {
                tracing::trace!("{} rejected: matches exclude pattern", url);
                return false;
            }
        }

        let category: LinkCategory = classify_link(url).category;
        if !config.types_to_scrape.contains(&category) {
            tracing::trace!("{} rejected: category {} not scraped", url, category);
            return false;
        }

        true
    }
}
