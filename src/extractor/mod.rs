pub mod dom;
pub mod language;
pub mod metadata;
pub mod model;

#[cfg(test)]
mod tests;

pub use dom::{HtmlDocument, HtmlNode, ScraperDocument};
pub use model::ExtractedMetadata;

use tracing::debug;
use url::Url;

use crate::fetcher::types::RawPage;

/// Extract bookmark metadata from a fetched page.
///
/// Never fails: error pages and garbage markup simply produce thinner
/// metadata (an `"Untitled"` title, an empty description).
pub fn extract(page: &RawPage) -> ExtractedMetadata {
    let document = ScraperDocument::parse(&page.html);
    extract_document(&document, &page.url_final)
}

/// Same rules as [`extract`], against any [`HtmlDocument`].
pub fn extract_document<D: HtmlDocument>(document: &D, page_url: &Url) -> ExtractedMetadata {
    let title = metadata::resolve_title(document);
    let description = metadata::resolve_description(document);
    let candidate_images = metadata::candidate_images(document, page_url);
    let raw_text_excerpt = metadata::text_excerpt(document, metadata::EXCERPT_CAP);
    let language = language::detect_language(&raw_text_excerpt).map(str::to_string);

    debug!(
        title = %title,
        description_chars = description.chars().count(),
        images = candidate_images.len(),
        excerpt_chars = raw_text_excerpt.chars().count(),
        language = ?language,
        "metadata extracted"
    );

    ExtractedMetadata {
        title,
        description,
        candidate_images,
        raw_text_excerpt,
        language,
    }
}
