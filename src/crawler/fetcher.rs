//! HTTP fetcher
//!
//! This module performs the single GET request behind every crawl node:
//! - Building the shared HTTP client (gzip, brotli, redirects followed)
//! - Applying per-crawl request options (user agent, timeout, basic auth,
//!   custom headers and cookies)
//! - Classifying failures so the traversal can skip the node

use reqwest::header::{COOKIE, USER_AGENT};
use reqwest::Client;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Basic-auth credentials sent with every request of a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
}

/// Request options shared by every fetch of a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout: Duration,
    pub basic_auth: Option<BasicAuth>,
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("depthcrawl/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
            basic_auth: None,
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
        }
    }
}

impl FetchOptions {
    /// Renders the cookie jar as a single `Cookie` header value
    ///
    /// Returns None when no cookies are configured.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Why a page could not be fetched
///
/// A fetch error never aborts a crawl; the node is skipped and counted.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read body of {url}: {reason}")]
    Body { url: String, reason: String },
}

/// Anything that can turn a URL into page text
///
/// The traversal is generic over this trait so tests and embedders can
/// substitute their own transport.
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the decoded response body
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Body of a 2xx response
    /// * `Err(FetchError)` - Transport error, non-2xx status or unreadable body
    fn fetch(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Builds the HTTP client shared by all fetches
///
/// Per-crawl options are applied per request, so one client serves every
/// crawl in the process.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (TLS backend unavailable)
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client()?,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
        let mut request = self
            .client
            .get(url)
            .timeout(options.timeout)
            .header(USER_AGENT, options.user_agent.as_str());

        if let Some(auth) = &options.basic_auth {
            request = request.basic_auth(&auth.username, auth.password.as_ref());
        }
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(cookie) = options.cookie_header() {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
