//! Title, description, image and excerpt resolution rules.

use std::collections::HashSet;

use url::Url;

use crate::extractor::dom::{HtmlDocument, HtmlNode};
use crate::extractor::model::{collapse_whitespace, truncate_chars, word_count};

pub const UNTITLED: &str = "Untitled";

/// Meta descriptions shorter than this are considered too thin to keep.
pub const MIN_DESCRIPTION_WORDS: usize = 10;
/// Upper bound for a description scraped from paragraphs.
pub const DESCRIPTION_CAP: usize = 350;
pub const MAX_CANDIDATE_IMAGES: usize = 20;
pub const EXCERPT_CAP: usize = 8000;

const CONTENT_REGIONS: [&str; 3] = ["article", "main", "body"];
const EXCERPT_TAGS: &str = "h1, h2, h3, h4, h5, h6, p, li";

/// `og:title` as published, then `<title>`, then the first `<h1>`, then [`UNTITLED`].
pub fn resolve_title<D: HtmlDocument>(doc: &D) -> String {
    social_property(doc, "og:title")
        .or_else(|| first_text(doc, "title"))
        .or_else(|| first_text(doc, "h1"))
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Meta description with a paragraph-scraping fallback for thin or missing ones.
pub fn resolve_description<D: HtmlDocument>(doc: &D) -> String {
    let meta = social_property(doc, "og:description")
        .or_else(|| named_meta(doc, "description"))
        .map(|description| description.trim().to_string());

    if let Some(description) = &meta
        && word_count(description) >= MIN_DESCRIPTION_WORDS
    {
        return description.clone();
    }

    let scraped = scrape_paragraphs(doc, DESCRIPTION_CAP);
    if !scraped.is_empty() {
        return scraped;
    }

    meta.map(|description| truncate_chars(&description, DESCRIPTION_CAP))
        .unwrap_or_default()
}

/// `og:image` followed by every non-inline `<img src>`, absolute and de-duplicated.
///
/// Sources that don't resolve to an http(s) URL are skipped.
pub fn candidate_images<D: HtmlDocument>(doc: &D, page_url: &Url) -> Vec<String> {
    let base = document_base(doc, page_url);

    let sources = social_property(doc, "og:image")
        .map(|src| src.trim().to_string())
        .into_iter()
        .chain(
            doc.select_tag("img")
                .into_iter()
                .filter_map(|img| img.attr("src").map(|src| src.trim().to_string())),
        );

    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for src in sources {
        if src.is_empty() || src.get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:")) {
            continue;
        }
        let Ok(absolute) = base.join(&src) else {
            continue;
        };
        if !matches!(absolute.scheme(), "http" | "https") {
            continue;
        }
        let absolute = absolute.to_string();
        if seen.insert(absolute.clone()) {
            images.push(absolute);
            if images.len() == MAX_CANDIDATE_IMAGES {
                break;
            }
        }
    }

    images
}

/// Heading, paragraph and list-item text, whitespace-collapsed and capped.
///
/// Elements nested in another excerpt element are already covered by the
/// outer element's text and are skipped.
pub fn text_excerpt<D: HtmlDocument>(doc: &D, cap: usize) -> String {
    let mut excerpt = String::new();
    let mut length = 0;

    for node in doc.select_tag(EXCERPT_TAGS) {
        if node.has_ancestor(EXCERPT_TAGS) {
            continue;
        }
        let text = collapse_whitespace(&node.text());
        if text.is_empty() {
            continue;
        }
        if !excerpt.is_empty() {
            excerpt.push(' ');
            length += 1;
        }
        length += text.chars().count();
        excerpt.push_str(&text);
        if length >= cap {
            break;
        }
    }

    truncate_chars(&excerpt, cap)
}

/// Collect `<p>` text from the preferred content region until `cap` is reached.
fn scrape_paragraphs<D: HtmlDocument>(doc: &D, cap: usize) -> String {
    let Some(region) = CONTENT_REGIONS
        .iter()
        .find_map(|tag| doc.select_tag(tag).into_iter().next())
    else {
        return String::new();
    };

    let mut collected = String::new();
    for paragraph in region.select_tag("p") {
        let text = collapse_whitespace(&paragraph.text());
        if text.is_empty() {
            continue;
        }
        if !collected.is_empty() {
            collected.push(' ');
        }
        collected.push_str(&text);
        if collected.chars().count() >= cap {
            break;
        }
    }

    truncate_chars(&collected, cap)
}

fn document_base<D: HtmlDocument>(doc: &D, page_url: &Url) -> Url {
    doc.select_tag("base")
        .into_iter()
        .find_map(|base| base.attr("href").and_then(|href| page_url.join(href.trim()).ok()))
        .unwrap_or_else(|| page_url.clone())
}

/// Open Graph values are published as `property=` but `name=` shows up in the wild too.
fn social_property<D: HtmlDocument>(doc: &D, property: &str) -> Option<String> {
    meta_content(doc, "property", property).or_else(|| meta_content(doc, "name", property))
}

fn named_meta<D: HtmlDocument>(doc: &D, name: &str) -> Option<String> {
    meta_content(doc, "name", name)
}

/// First non-blank `content` for the key, untouched.
fn meta_content<D: HtmlDocument>(doc: &D, key_attr: &str, key: &str) -> Option<String> {
    doc.select_tag("meta")
        .into_iter()
        .filter(|meta| meta.attr(key_attr).is_some_and(|value| value.trim().eq_ignore_ascii_case(key)))
        .filter_map(|meta| meta.attr("content").map(str::to_string))
        .find(|content| !content.trim().is_empty())
}

fn first_text<D: HtmlDocument>(doc: &D, tag: &str) -> Option<String> {
    doc.select_tag(tag)
        .into_iter()
        .map(|node| collapse_whitespace(&node.text()))
        .find(|text| !text.is_empty())
}
