//! Main-content heuristic in the readability family
//!
//! Clutter elements are detached first. Every remaining block candidate is
//! then scored by text length, paragraph and heading counts, and link
//! density; the best candidate's markup is returned, headed by the page title.

use crate::extract::{ContentExtractor, NO_SCRAPE};
use scraper::{ElementRef, Html, Node, Selector};

/// Elements that never carry main content
const CLUTTER_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "footer", "header", "form", "aside", "iframe",
    "template", "svg",
];

/// Class/id fragments that mark navigation, ads and similar boilerplate
const BOILERPLATE_HINTS: &[&str] = &[
    "nav", "menu", "footer", "header", "sidebar", "comment", "cookie", "banner", "advert",
    "social", "share", "breadcrumb", "related", "popup", "modal",
];

/// Text counted per candidate is capped so huge wrappers don't win on size alone
const MAX_COUNTED_TEXT: usize = 8000;

struct Selectors {
    candidates: Selector,
    paragraphs: Selector,
    headings: Selector,
    links: Selector,
    title: Selector,
}

impl Selectors {
    fn compile() -> Option<Self> {
        Some(Self {
            candidates: Selector::parse("body, article, main, section, div, td").ok()?,
            paragraphs: Selector::parse("p").ok()?,
            headings: Selector::parse("h1, h2, h3, h4, h5, h6").ok()?,
            links: Selector::parse("a").ok()?,
            title: Selector::parse("title").ok()?,
        })
    }
}

/// Readability-style extractor
///
/// Returns [`NO_SCRAPE`] when the document has no readable text at all.
pub struct ReadabilityExtractor {
    selectors: Option<Selectors>,
}

impl Default for ReadabilityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadabilityExtractor {
    pub fn new() -> Self {
        Self {
            selectors: Selectors::compile(),
        }
    }

    fn best_candidate<'a>(&self, document: &'a Html, sel: &Selectors) -> Option<ElementRef<'a>> {
        let mut best: Option<(i64, ElementRef<'a>)> = None;

        for element in document.select(&sel.candidates) {
            let name = element.value().name();
            if name != "body" && looks_like_boilerplate(&element) {
                continue;
            }

            let score = score_candidate(&element, sel);
            tracing::trace!("readability candidate <{}> scored {}", name, score);

            if score > 0 && best.as_ref().map_or(true, |(top, _)| score > *top) {
                best = Some((score, element));
            }
        }

        best.map(|(_, element)| element)
    }
}

impl ContentExtractor for ReadabilityExtractor {
    fn extract(&self, html: &str) -> String {
        let Some(sel) = &self.selectors else {
            return NO_SCRAPE.to_string();
        };
        if html.trim().is_empty() {
            return NO_SCRAPE.to_string();
        }

        let mut document = Html::parse_document(html);
        let title = document
            .select(&sel.title)
            .next()
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .filter(|t| !t.is_empty());

        remove_clutter(&mut document);

        let Some(best) = self.best_candidate(&document, sel) else {
            return NO_SCRAPE.to_string();
        };

        let body = best.inner_html();
        let body = body.trim();
        match title {
            Some(title) => format!("<h1>{}</h1>\n{}", html_escape::encode_text(&title), body),
            None => body.to_string(),
        }
    }
}

fn remove_clutter(document: &mut Html) {
    let doomed: Vec<_> = document
        .tree
        .nodes()
        .filter(|node| match node.value() {
            Node::Element(element) => CLUTTER_TAGS.contains(&element.name()),
            Node::Comment(_) => true,
            _ => false,
        })
        .map(|node| node.id())
        .collect();

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn looks_like_boilerplate(element: &ElementRef) -> bool {
    let value = element.value();
    let mut names = value.classes().chain(value.id());
    names.any(|name| {
        let name = name.to_ascii_lowercase();
        BOILERPLATE_HINTS.iter().any(|hint| name.contains(hint))
    })
}

/// Scores one candidate; higher is more likely to be the main content
fn score_candidate(element: &ElementRef, sel: &Selectors) -> i64 {
    let text = collapse_whitespace(&element.text().collect::<String>());
    let text_len = text.chars().count();
    if text_len == 0 {
        return 0;
    }

    let mut paragraphs = 0i64;
    let mut substantive = 0i64;
    for p in element.select(&sel.paragraphs) {
        paragraphs += 1;
        if collapse_whitespace(&p.text().collect::<String>()).chars().count() >= 100 {
            substantive += 1;
        }
    }

    let headings = element.select(&sel.headings).count() as i64;

    let mut links = 0i64;
    let mut link_text_len = 0usize;
    for a in element.select(&sel.links) {
        links += 1;
        link_text_len += collapse_whitespace(&a.text().collect::<String>())
            .chars()
            .count();
    }
    let link_density = link_text_len as f64 / text_len as f64;

    let depth = element.ancestors().count() as i64;

    let mut score = text_len.min(MAX_COUNTED_TEXT) as i64;
    score += paragraphs * 200;
    score += substantive * 300;
    score += headings * 100;
    score -= links * 50;
    score += depth * 10;
    score += match element.value().name() {
        "article" => 500,
        "main" => 300,
        _ => 0,
    };

    if link_density > 0.5 {
        score /= 2;
    }

    // Any readable text is better than nothing
    score.max(1)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| !word.chars().all(char::is_control))
        .collect::<Vec<_>>()
        .join(" ")
}
