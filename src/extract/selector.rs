use crate::extract::ContentExtractor;
use crate::ConfigError;
use scraper::{Html, Node, Selector};

/// Parsed `tag[.class][#id]` selector
///
/// Class and id may appear in either order, at most once each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSpec {
    pub tag: String,
    pub class: Option<String>,
    pub id: Option<String>,
}

impl Default for SelectorSpec {
    fn default() -> Self {
        Self {
            tag: "body".to_string(),
            class: None,
            id: None,
        }
    }
}

impl SelectorSpec {
    /// Parses a selector tag such as `div`, `div.content`, `main#top` or `div.a#b`
    ///
    /// # Returns
    ///
    /// * `Ok(SelectorSpec)` - Parsed selector
    /// * `Err(ConfigError::InvalidSelector)` - Empty tag, empty or repeated
    ///   class/id, or characters outside `[A-Za-z0-9_-]`
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        let invalid = |why: &str| ConfigError::InvalidSelector(format!("'{}': {}", raw, why));

        let tag_end = raw.find(['.', '#']).unwrap_or(raw.len());
        let tag = &raw[..tag_end];
        if tag.is_empty() {
            return Err(invalid("missing tag name"));
        }
        if !is_tag_name(tag) {
            return Err(invalid("tag name must be a letter followed by letters, digits or '-'"));
        }

        let mut spec = Self {
            tag: tag.to_ascii_lowercase(),
            class: None,
            id: None,
        };

        let mut rest = &raw[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];

            if name.is_empty() {
                return Err(invalid("empty class or id"));
            }
            if !is_css_identifier(name) {
                return Err(invalid("class and id must be CSS identifiers"));
            }

            let slot = if marker == '.' { &mut spec.class } else { &mut spec.id };
            if slot.is_some() {
                return Err(invalid("class and id may each appear once"));
            }
            *slot = Some(name.to_string());

            rest = &body[end..];
        }

        Ok(spec)
    }

    /// Renders the spec as a CSS selector
    pub fn to_css(&self) -> String {
        let mut css = self.tag.clone();
        if let Some(class) = &self.class {
            css.push('.');
            css.push_str(class);
        }
        if let Some(id) = &self.id {
            css.push('#');
            css.push_str(id);
        }
        css
    }
}

/// Matches HTML element names, including custom elements such as `my-widget`
fn is_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_css_identifier(name: &str) -> bool {
    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '-');
    starts_ok
        && !name.starts_with("--")
        && !name.starts_with("-0")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Extracts the children of every element matching a [`SelectorSpec`]
///
/// Elements named in the removal list are detached from the whole document
/// first. The node ids are snapshotted before any removal so that detaching
/// one node never causes a sibling to be skipped.
pub struct SelectorExtractor {
    selector: Option<Selector>,
    remove_tags: Vec<String>,
}

impl SelectorExtractor {
    pub fn new(spec: &SelectorSpec, remove_tags: Vec<String>) -> Self {
        let selector = Selector::parse(&spec.to_css()).ok();
        if selector.is_none() {
            tracing::warn!("Selector '{}' did not compile; extraction will be empty", spec.to_css());
        }
        Self {
            selector,
            remove_tags,
        }
    }

    fn remove_elements(&self, document: &mut Html) {
        if self.remove_tags.is_empty() {
            return;
        }

        let doomed: Vec<_> = document
            .tree
            .nodes()
            .filter(|node| match node.value() {
                Node::Element(element) => self.remove_tags.iter().any(|t| t == element.name()),
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
}

impl ContentExtractor for SelectorExtractor {
    fn extract(&self, html: &str) -> String {
        let Some(selector) = &self.selector else {
            return String::new();
        };

        let mut document = Html::parse_document(html);
        self.remove_elements(&mut document);

        document
            .select(selector)
            .map(|element| element.inner_html())
            .collect::<Vec<_>>()
            .concat()
    }
}
