//! Prompt construction for the summarisation model.
//!
//! The page-content prompt hands the model text we already extracted and
//! trust, so the model only has to condense it. The URL-only prompt is for
//! the no-fetch fallback and additionally asks for an `imageUrl`.

pub mod schema;

use std::fmt::Write as _;

use url::Url;

use crate::extractor::{ExtractedMetadata, model::truncate_chars};

pub use schema::{PageSummary, UrlSummary};

/// Description text embedded in the prompt is capped at this many chars.
pub const PROMPT_DESCRIPTION_CAP: usize = 500;
/// Page excerpt embedded in the prompt is capped at this many chars.
pub const PROMPT_EXCERPT_CAP: usize = 2000;

const SYSTEM_INSTRUCTION: &str = "You write metadata for a personal bookmark library. \
Respond with a single JSON object that matches the provided schema and nothing else.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    /// Built from fetched and extracted page content.
    PageContent,
    /// Built from the URL alone; the schema also requires `imageUrl`.
    UrlOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// JSON schema the response must satisfy.
    pub schema: serde_json::Value,
    pub variant: PromptVariant,
}

/// Prompt grounded in extracted page metadata.
pub fn build(metadata: &ExtractedMetadata, url: &Url) -> Prompt {
    let description = truncate_chars(&metadata.description, PROMPT_DESCRIPTION_CAP);
    let excerpt = truncate_chars(&metadata.raw_text_excerpt, PROMPT_EXCERPT_CAP);

    let mut user = String::new();
    user.push_str("Create bookmark metadata for the web page below.\n\n");
    let _ = writeln!(user, "URL: {url}");
    let _ = writeln!(user, "Extracted title: {}", metadata.title);
    let _ = writeln!(user, "Extracted description: {description}");
    if let Some(language) = &metadata.language {
        let _ = writeln!(user, "Page language (ISO 639-1): {language}");
    }
    if !excerpt.is_empty() {
        let _ = write!(user, "Page text excerpt:\n\"\"\"\n{excerpt}\n\"\"\"\n");
    }

    user.push_str(
        "\nInstructions:\n\
         - title: keep the extracted title unless it is missing, truncated or obviously boilerplate; then write a better one from the supplied text.\n\
         - description: one neutral paragraph (2-4 sentences) summarising what the page offers.\n\
         - tags: 4 or 5 short lowercase topical tags.\n\
         - Use only facts present in the supplied text. Do not invent names, numbers, dates or claims.\n",
    );
    if metadata.language.is_some() {
        user.push_str("- Write the title and description in the page's language.\n");
    }

    Prompt {
        system: SYSTEM_INSTRUCTION.to_string(),
        user,
        schema: schema::schema_value::<PageSummary>(),
        variant: PromptVariant::PageContent,
    }
}

/// Prompt for when the page could not be fetched: infer from the URL alone.
pub fn build_url_only(url: &Url) -> Prompt {
    let mut user = String::new();
    user.push_str("Create bookmark metadata for the URL below without visiting it.\n\n");
    let _ = writeln!(user, "URL: {url}");
    user.push_str(
        "\nInstructions:\n\
         - title: the most likely title of the page, inferred from the domain and path.\n\
         - description: one neutral paragraph (2-3 sentences) describing what the page most likely contains.\n\
         - tags: 4 or 5 short lowercase topical tags.\n\
         - imageUrl: an absolute URL of a representative image you are confident exists for this site (for example its logo), or an empty string.\n\
         - Stay general where the URL gives no evidence. Do not invent specific facts.\n",
    );

    Prompt {
        system: SYSTEM_INSTRUCTION.to_string(),
        user,
        schema: schema::schema_value::<UrlSummary>(),
        variant: PromptVariant::UrlOnly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ExtractedMetadata {
        ExtractedMetadata {
            title: "Widgets Inc".to_string(),
            description: String::new(),
            candidate_images: vec![],
            raw_text_excerpt: "We make widgets. ".repeat(500),
            language: Some("en".to_string()),
        }
    }

    #[test]
    fn test_page_prompt_carries_ground_truth() {
        let url = Url::parse("https://widgets.example.com/").unwrap();
        let prompt = build(&metadata(), &url);

        assert_eq!(prompt.variant, PromptVariant::PageContent);
        assert!(prompt.user.contains("URL: https://widgets.example.com/"));
        assert!(prompt.user.contains("Extracted title: Widgets Inc"));
        assert!(prompt.user.contains("Extracted description: \n"));
        assert!(prompt.user.contains("lowercase"));
        assert!(prompt.user.contains("Do not invent"));
        assert!(prompt.user.contains("page's language"));
    }

    #[test]
    fn test_page_prompt_is_bounded() {
        let url = Url::parse("https://widgets.example.com/").unwrap();
        let mut long = metadata();
        long.description = "d".repeat(5000);
        let prompt = build(&long, &url);

        assert!(!prompt.user.contains(&"d".repeat(PROMPT_DESCRIPTION_CAP + 1)));
        assert!(prompt.user.chars().count() < PROMPT_DESCRIPTION_CAP + PROMPT_EXCERPT_CAP + 1500);
    }

    #[test]
    fn test_page_schema_requires_core_fields() {
        let url = Url::parse("https://example.com/").unwrap();
        let schema = build(&metadata(), &url).schema;

        assert_eq!(schema["type"], "object");
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        for field in ["title", "description", "tags"] {
            assert!(required.contains(&field), "missing {field}");
        }
        assert!(!required.contains(&"imageUrl"));
        assert_eq!(schema["properties"]["tags"]["type"], "array");
        assert_eq!(schema["properties"]["tags"]["items"]["type"], "string");
    }

    #[test]
    fn test_url_only_prompt_asks_for_image() {
        let url = Url::parse("https://docs.rs/serde").unwrap();
        let prompt = build_url_only(&url);

        assert_eq!(prompt.variant, PromptVariant::UrlOnly);
        assert!(prompt.user.contains("https://docs.rs/serde"));
        assert!(prompt.user.contains("imageUrl"));
        let required = prompt.schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "imageUrl"));
    }
}
