use std::collections::HashSet;
use url::Url;

/// Splits a comma- or newline-delimited word list
///
/// Entries are trimmed; empty entries are dropped. Order is preserved.
///
/// # Examples
///
/// ```
/// use depthcrawl::url::parse_word_list;
///
/// assert_eq!(parse_word_list("login, register\nprivacy\n\n"), vec!["login", "register", "privacy"]);
/// ```
pub fn parse_word_list(list: &str) -> Vec<String> {
    list.split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Checks if any path segment of a URL exactly equals an excluded word
///
/// Matching is case-sensitive and whole-segment only: `login` excludes
/// `/user/login` but not `/login-help` or `/Login`.
pub fn has_excluded_segment(url: &Url, excluded: &HashSet<String>) -> bool {
    if excluded.is_empty() {
        return false;
    }

    match url.path_segments() {
        Some(mut segments) => segments.any(|segment| excluded.contains(segment)),
        None => false,
    }
}
