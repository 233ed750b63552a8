use crate::config::types::{CrawlSettings, RequestSettings, TraversalSettings};
use crate::url::parse_word_list;
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};

/// Validates the entire crawl profile
pub fn validate(settings: &CrawlSettings) -> Result<(), ConfigError> {
    validate_traversal_settings(&settings.crawl)?;
    validate_request_settings(&settings.request)?;
    Ok(())
}

/// Validates traversal settings
fn validate_traversal_settings(settings: &TraversalSettings) -> Result<(), ConfigError> {
    // depth >= 0 is always true for u32, so no check needed

    if settings.types_to_scrape.is_empty() {
        return Err(ConfigError::Validation(
            "types_to_scrape must name at least one category".to_string(),
        ));
    }

    for segment in parse_word_list(&settings.exclude_pages) {
        if segment.contains('/') {
            return Err(ConfigError::Validation(format!(
                "exclude_pages entries are single path segments, got '{}'",
                segment
            )));
        }
    }

    Ok(())
}

/// Validates request settings
fn validate_request_settings(settings: &RequestSettings) -> Result<(), ConfigError> {
    if settings.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if settings.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if let Some(auth) = &settings.basic_auth {
        if auth.username.is_empty() {
            return Err(ConfigError::Validation(
                "basic_auth username cannot be empty".to_string(),
            ));
        }
    }

    for (name, value) in &settings.headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::Validation(format!("Invalid header name: '{}'", name))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Validation(format!("Invalid value for header '{}'", name))
        })?;
    }

    for (name, value) in &settings.cookies {
        validate_cookie_pair(name, value)?;
    }

    Ok(())
}

/// Cookie names and values end up in a single `Cookie` header
fn validate_cookie_pair(name: &str, value: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "cookie name cannot be empty".to_string(),
        ));
    }

    let forbidden = |c: char| c == ';' || c == '=' || c.is_whitespace() || c.is_control();
    if name.chars().any(forbidden) {
        return Err(ConfigError::Validation(format!(
            "Invalid cookie name: '{}'",
            name
        )));
    }

    if value.chars().any(|c| c == ';' || c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "Invalid value for cookie '{}'",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BasicAuthSettings;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate(&CrawlSettings::default()).is_ok());
    }

    #[test]
    fn test_empty_types_rejected() {
        let mut settings = CrawlSettings::default();
        settings.crawl.types_to_scrape.clear();
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_exclude_page_with_slash_rejected() {
        let mut settings = CrawlSettings::default();
        settings.crawl.exclude_pages = "user/login".to_string();
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut settings = CrawlSettings::default();
        settings.request.timeout_secs = 0;
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut settings = CrawlSettings::default();
        settings
            .request
            .headers
            .insert("Bad Header".to_string(), "x".to_string());
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_empty_basic_auth_user_rejected() {
        let mut settings = CrawlSettings::default();
        settings.request.basic_auth = Some(BasicAuthSettings {
            username: String::new(),
            password: None,
        });
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn test_validate_cookie_pair() {
        assert!(validate_cookie_pair("session", "abc123").is_ok());
        assert!(validate_cookie_pair("theme", "dark mode").is_ok());

        assert!(validate_cookie_pair("", "x").is_err());
        assert!(validate_cookie_pair("a=b", "x").is_err());
        assert!(validate_cookie_pair("a b", "x").is_err());
        assert!(validate_cookie_pair("session", "a;b").is_err());
    }
}
