use crate::extract::ContentExtractor;

/// Returns the whole document with encoding artifacts normalized
///
/// The body arrives already decoded to UTF-8 by the fetcher; this only
/// removes a leading byte-order mark and NUL characters and normalizes line
/// endings to `\n`. No structural cleanup is done.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDumpExtractor;

impl ContentExtractor for RawDumpExtractor {
    fn extract(&self, html: &str) -> String {
        let html = html.strip_prefix('\u{feff}').unwrap_or(html);
        html.replace("\r\n", "\n")
            .replace('\r', "\n")
            .replace('\0', "")
    }
}
