use reqwest::StatusCode;
use std::fs;
use url::Url;

use crate::extractor::{extract, metadata::DESCRIPTION_CAP};
use crate::fetcher::types::RawPage;

fn fixture_page(name: &str, url: &str) -> RawPage {
    let html = fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture");
    RawPage::from_html(Url::parse(url).unwrap(), html)
}

#[test]
fn test_extract_article() {
    let page = fixture_page("article.html", "https://example.com/article");
    let metadata = extract(&page);

    assert_eq!(metadata.title, "Sample Article");

    // The meta description is a three-word teaser, so paragraphs are used instead
    assert!(metadata.description.starts_with("This is the first paragraph"));
    assert!(metadata.description.contains("second paragraph"));
    assert!(metadata.description.chars().count() <= DESCRIPTION_CAP);
    assert!(!metadata.description.contains("Copyright"));

    assert_eq!(
        metadata.candidate_images,
        vec![
            "https://example.com/images/cover.jpg",
            "https://example.com/images/sample.jpg",
        ]
    );
    assert!(metadata.raw_text_excerpt.contains("third paragraph"));
    assert!(!metadata.raw_text_excerpt.contains("tracking"));
    assert_eq!(metadata.language.as_deref(), Some("en"));
}

#[test]
fn test_extract_blog_post() {
    let page = fixture_page("blog.html", "https://blog.example.com/post");
    let metadata = extract(&page);

    assert_eq!(metadata.title, "How to Build Better Software | Tech Blog");
    assert!(metadata.description.starts_with("Building better software is about small feedback loops"));
    assert_eq!(
        metadata.candidate_images,
        vec!["https://blog.example.com/diagrams/loop.png"]
    );
    assert!(metadata.raw_text_excerpt.contains("Key Principles"));
    assert!(metadata.raw_text_excerpt.contains("Keep functions small and focused."));
}

#[test]
fn test_extract_social_title_only() {
    let page = fixture_page("social_only.html", "https://widgets.example.com/");
    let metadata = extract(&page);

    assert_eq!(metadata.title, "Widgets Inc");
    assert_eq!(metadata.description, "");
    assert!(metadata.candidate_images.is_empty());
    assert_eq!(metadata.raw_text_excerpt, "");
    assert_eq!(metadata.language, None);
}

#[test]
fn test_extract_tolerates_error_page() {
    let mut page = fixture_page("error_page.html", "https://example.com/missing");
    page.status = StatusCode::NOT_FOUND;
    let metadata = extract(&page);

    assert_eq!(metadata.title, "404 Not Found");
    assert_eq!(metadata.description, "");
}

#[test]
fn test_extract_empty_body() {
    let page = RawPage::from_html(Url::parse("https://example.com/file.pdf").unwrap(), "");
    let metadata = extract(&page);

    assert_eq!(metadata.title, "Untitled");
    assert_eq!(metadata.description, "");
    assert!(metadata.candidate_images.is_empty());
}

#[test]
fn test_malformed_html() {
    let html = "<html><head><title>Broken</title><body><p>Unclosed tags<div>More content";
    let page = RawPage::from_html(Url::parse("https://example.com/broken").unwrap(), html);
    let metadata = extract(&page);

    assert_eq!(metadata.title, "Broken");
    assert!(metadata.description.contains("Unclosed tags"));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use crate::extractor::metadata::{EXCERPT_CAP, MAX_CANDIDATE_IMAGES};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(
            html in ".*",
            url in "https://[a-z]+\\.com/[a-z]*"
        ) {
            let page = RawPage::from_html(Url::parse(&url).unwrap(), html);
            let metadata = extract(&page);
            prop_assert!(!metadata.title.is_empty());
            prop_assert!(metadata.candidate_images.len() <= MAX_CANDIDATE_IMAGES);
            prop_assert!(metadata.raw_text_excerpt.chars().count() <= EXCERPT_CAP);
        }

        #[test]
        fn test_social_title_is_returned_verbatim(
            title in " {0,2}[A-Za-z0-9][A-Za-z0-9 ,.!?-]{0,60}[A-Za-z0-9] {0,2}",
        ) {
            let html = format!(
                r#"<html><head><meta property="og:title" content="{title}"><title>Other</title></head></html>"#
            );
            let page = RawPage::from_html(Url::parse("https://example.com").unwrap(), html);
            prop_assert_eq!(extract(&page).title, title);
        }

        #[test]
        fn test_short_meta_description_scrape_is_capped(
            words in proptest::collection::vec("[a-z]{1,12}", 0..9),
            paragraphs in proptest::collection::vec("[a-z ]{0,200}", 0..10),
        ) {
            let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
            let html = format!(
                r#"<html><head><meta name="description" content="{}"></head><body>{body}</body></html>"#,
                words.join(" ")
            );
            let page = RawPage::from_html(Url::parse("https://example.com").unwrap(), html);
            prop_assert!(extract(&page).description.chars().count() <= DESCRIPTION_CAP);
        }
    }
}
