//! Markdown summary generation
//!
//! Renders a crawl report as a human-readable markdown document: run
//! statistics first, then the collected links or content units.

use crate::crawler::{CrawlFlavor, CrawlReport};

/// Formats a crawl report as markdown
///
/// # Arguments
///
/// * `report` - The crawl report
/// * `flavor` - Whether the links or the contents are listed
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_report(report: &CrawlReport, flavor: CrawlFlavor) -> String {
    let mut md = String::new();

    md.push_str("# Crawl Report\n\n");

    md.push_str("## Statistics\n\n");
    md.push_str(&format!("- **Pages Fetched**: {}\n", report.pages_fetched));
    md.push_str(&format!("- **Fetch Failures**: {}\n", report.fetch_failures));
    match flavor {
        CrawlFlavor::Content => {
            md.push_str(&format!("- **Content Units**: {}\n", report.contents.len()));
        }
        CrawlFlavor::Links => {
            md.push_str(&format!("- **Links**: {}\n", report.links.len()));
        }
    }
    if report.cancelled {
        md.push_str("- **Status**: cancelled before completion\n");
    } else if report.incomplete {
        md.push_str("- **Status**: incomplete, a batch step was abandoned\n");
    }
    md.push('\n');

    match flavor {
        CrawlFlavor::Links => {
            md.push_str("## Links\n\n");
            if report.links.is_empty() {
                md.push_str("_No links collected._\n");
            }
            for link in &report.links {
                md.push_str(&format!("- <{}>\n", link));
            }
        }
        CrawlFlavor::Content => {
            md.push_str("## Content\n\n");
            if report.contents.is_empty() {
                md.push_str("_No content collected._\n");
            }
            for unit in &report.contents {
                md.push_str(&format!("### {}\n\n", unit.source_url));
                md.push_str("```html\n");
                md.push_str(&unit.text);
                if !unit.text.ends_with('\n') {
                    md.push('\n');
                }
                md.push_str("```\n\n");
            }
        }
    }

    md
}
