use serde::{Deserialize, Serialize};

/// What the extractor learned about a page. Lives for one analysis only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub title: String,
    /// May be empty; the model is asked to compensate.
    pub description: String,
    /// Absolute URLs, best candidate first.
    pub candidate_images: Vec<String>,
    pub raw_text_excerpt: String,
    /// ISO 639-1 code of the excerpt, when it could be detected.
    pub language: Option<String>,
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max_chars` characters, never splitting a char.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
