//! Output module for rendering crawl reports
//!
//! This module handles:
//! - Plain text listings (one link per line, content blocks separated by rules)
//! - JSON export of the full report
//! - Markdown summaries with run statistics

mod markdown;

pub use markdown::format_markdown_report;

use crate::crawler::{CrawlFlavor, CrawlReport};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// How a report is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(OutputError::UnknownFormat(other.to_string())),
        }
    }
}

/// Renders a report in the requested format
///
/// # Arguments
///
/// * `report` - The crawl report
/// * `flavor` - Which half of the report is meaningful
/// * `format` - Output format
///
/// # Returns
///
/// * `Ok(String)` - Rendered report
/// * `Err(OutputError)` - JSON serialization failed
pub fn render_report(
    report: &CrawlReport,
    flavor: CrawlFlavor,
    format: OutputFormat,
) -> OutputResult<String> {
    match format {
        OutputFormat::Text => Ok(format_text_report(report, flavor)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Markdown => Ok(format_markdown_report(report, flavor)),
    }
}

/// Renders a report and writes it to `path`
pub fn write_report(
    report: &CrawlReport,
    flavor: CrawlFlavor,
    format: OutputFormat,
    path: &Path,
) -> OutputResult<()> {
    let rendered = render_report(report, flavor, format)?;

    let mut file = File::create(path)?;
    file.write_all(rendered.as_bytes())?;

    Ok(())
}

fn format_text_report(report: &CrawlReport, flavor: CrawlFlavor) -> String {
    let mut out = String::new();
    match flavor {
        CrawlFlavor::Links => {
            for link in &report.links {
                out.push_str(link);
                out.push('\n');
            }
        }
        CrawlFlavor::Content => {
            for (i, unit) in report.contents.iter().enumerate() {
                if i > 0 {
                    out.push_str("\n----\n\n");
                }
                out.push_str(&format!("== {}\n", unit.source_url));
                out.push_str(&unit.text);
                out.push('\n');
            }
        }
    }
    out
}
