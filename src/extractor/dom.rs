//! Minimal HTML traversal capability used by the metadata rules.
//!
//! The rules in [`crate::extractor::metadata`] only ever need to find
//! elements by tag, read an attribute, and read text. Keeping that surface
//! behind a trait lets them run against any parser; [`ScraperDocument`] is
//! the implementation used in production.

use scraper::{ElementRef, Html, Selector};

pub trait HtmlNode: Sized {
    /// Descendants matching `tags`, in document order. `tags` is a tag name or
    /// a comma-separated list of tag names.
    fn select_tag(&self, tags: &str) -> Vec<Self>;

    fn attr(&self, name: &str) -> Option<&str>;

    /// Concatenated text of all descendant text nodes, unnormalized.
    fn text(&self) -> String;

    /// Whether any enclosing element matches `tags`.
    fn has_ancestor(&self, tags: &str) -> bool;
}

pub trait HtmlDocument {
    type Node<'a>: HtmlNode
    where
        Self: 'a;

    /// Elements matching `tags` anywhere in the document, in document order.
    fn select_tag(&self, tags: &str) -> Vec<Self::Node<'_>>;
}

/// [`HtmlDocument`] backed by `scraper` (html5ever).
pub struct ScraperDocument {
    html: Html,
}

impl ScraperDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }
}

impl HtmlDocument for ScraperDocument {
    type Node<'a> = ScraperNode<'a>;

    fn select_tag(&self, tags: &str) -> Vec<ScraperNode<'_>> {
        match Selector::parse(tags) {
            Ok(selector) => self.html.select(&selector).map(ScraperNode).collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScraperNode<'a>(ElementRef<'a>);

impl HtmlNode for ScraperNode<'_> {
    fn select_tag(&self, tags: &str) -> Vec<Self> {
        match Selector::parse(tags) {
            Ok(selector) => self.0.select(&selector).map(ScraperNode).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.0.value().attr(name)
    }

    fn text(&self) -> String {
        self.0.text().collect()
    }

    fn has_ancestor(&self, tags: &str) -> bool {
        let Ok(selector) = Selector::parse(tags) else {
            return false;
        };
        self.0
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| selector.matches(&ancestor))
    }
}
