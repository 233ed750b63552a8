//! URL handling module
//!
//! This module provides href resolution, host extraction, path-segment
//! exclusion matching, and link classification by file extension.

mod domain;
mod matcher;
mod resolve;

// Re-export main functions
pub use domain::{extract_host, same_host};
pub use matcher::{has_excluded_segment, parse_word_list};
pub use resolve::{parse_seed, resolve_href};

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Category of a link, derived from the extension of its last path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkCategory {
    Webpages,
    Images,
    Pdfs,
    Docs,
    Videos,
    Audios,
    Archives,
    Scripts,
    Others,
}

impl LinkCategory {
    /// Maps a lowercase extension (or its absence) to a category
    pub fn from_extension(extension: Option<&str>) -> Self {
        match extension {
            None | Some("html") | Some("htm") | Some("asp") | Some("aspx") | Some("php") => {
                Self::Webpages
            }
            Some("jpg") | Some("jpeg") | Some("png") | Some("gif") => Self::Images,
            Some("pdf") => Self::Pdfs,
            Some("doc") | Some("docx") => Self::Docs,
            Some("mp4") | Some("avi") | Some("mov") => Self::Videos,
            Some("mp3") | Some("wav") => Self::Audios,
            Some("zip") | Some("rar") | Some("7z") => Self::Archives,
            Some("js") | Some("css") => Self::Scripts,
            Some(_) => Self::Others,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Webpages => "webpages",
            Self::Images => "images",
            Self::Pdfs => "pdfs",
            Self::Docs => "docs",
            Self::Videos => "videos",
            Self::Audios => "audios",
            Self::Archives => "archives",
            Self::Scripts => "scripts",
            Self::Others => "others",
        }
    }
}

impl fmt::Display for LinkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived facts about a resolved link; never stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkClassification {
    pub url: String,
    pub extension: Option<String>,
    pub category: LinkCategory,
    pub host: Option<String>,
}

/// Classifies an absolute URL
///
/// The extension is taken from the last path segment, case-insensitively.
/// A segment without a dot (including the empty segment of `/dir/`) has no
/// extension and counts as a web page.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use depthcrawl::url::{classify_link, LinkCategory};
///
/// let url = Url::parse("https://example.com/files/Report.PDF").unwrap();
/// let link = classify_link(&url);
/// assert_eq!(link.extension.as_deref(), Some("pdf"));
/// assert_eq!(link.category, LinkCategory::Pdfs);
/// ```
pub fn classify_link(url: &Url) -> LinkClassification {
    let extension = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|last| last.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty());

    LinkClassification {
        url: url.to_string(),
        category: LinkCategory::from_extension(extension.as_deref()),
        extension,
        host: extract_host(url),
    }
}
