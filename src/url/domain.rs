use url::Url;

/// Extracts the host from a URL
///
/// The host is lowercased. Ports are not part of the host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use depthcrawl::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs have the same (case-insensitive) host
///
/// URLs without a host never match anything.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_host(a), extract_host(b)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}
