use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes that never lead to a crawlable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Resolves a raw href against the page it was found on
///
/// Returns None if the link should be dropped:
/// - empty hrefs and fragment-only anchors (`#`, `#section`)
/// - javascript:, mailto:, tel: and data: links
/// - hrefs that fail to resolve
/// - anything that is not HTTP(S) after resolution
///
/// The fragment of an accepted URL is removed, so `/page#a` and `/page#b`
/// resolve to the same page.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use depthcrawl::url::resolve_href;
///
/// let page = Url::parse("https://example.com/docs/intro").unwrap();
/// assert_eq!(
///     resolve_href("setup#install", &page).map(|u| u.to_string()),
///     Some("https://example.com/docs/setup".to_string())
/// );
/// assert_eq!(resolve_href("#top", &page), None);
/// ```
pub fn resolve_href(href: &str, page_url: &Url) -> Option<Url> {
    let href = html_escape::decode_html_entities(href.trim());

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    let mut resolved = page_url.join(&href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.host_str()?;

    resolved.set_fragment(None);
    Some(resolved)
}

/// Parses the seed URL of a crawl
///
/// # Returns
///
/// * `Ok(Url)` - Absolute HTTP(S) URL with a host, fragment removed
/// * `Err(UrlError)` - Unparsable, non-HTTP(S), or hostless input
pub fn parse_seed(raw: &str) -> UrlResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("'{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}
