use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::validator::MAX_TAGS;

/// Bookmark metadata for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// The normalized request URL (not the post-redirect URL).
    #[schema(example = "https://www.rust-lang.org")]
    pub url: String,
    pub title: String,
    pub description: String,
    /// Always an absolute URL.
    pub image_url: String,
    /// 1 to 8 unique lowercase tags.
    pub tags: Vec<String>,
    pub open_in_iframe: bool,
}

impl AnalysisResult {
    /// Checks the shape every caller relies on. Returns the first violated rule.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is empty".into());
        }
        if self.description.trim().is_empty() {
            return Err("description is empty".into());
        }
        if Url::parse(&self.url).is_err() {
            return Err(format!("url `{}` is not absolute", self.url));
        }
        match Url::parse(&self.image_url) {
            Ok(image) if matches!(image.scheme(), "http" | "https") => {}
            _ => return Err(format!("imageUrl `{}` is not an absolute http(s) URL", self.image_url)),
        }
        if self.tags.is_empty() || self.tags.len() > MAX_TAGS {
            return Err(format!("expected 1..={MAX_TAGS} tags, got {}", self.tags.len()));
        }

        let mut seen = HashSet::new();
        for tag in &self.tags {
            if tag.trim().is_empty() {
                return Err("tags contain an empty entry".into());
            }
            if *tag != tag.to_lowercase() {
                return Err(format!("tag `{tag}` is not lowercase"));
            }
            if !seen.insert(tag.to_lowercase()) {
                return Err(format!("tag `{tag}` is duplicated"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> AnalysisResult {
        AnalysisResult {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            description: "An example page.".to_string(),
            image_url: "https://example.com/a.png".to_string(),
            tags: vec!["example".to_string()],
            open_in_iframe: true,
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(result()).unwrap();
        assert_eq!(json["imageUrl"], "https://example.com/a.png");
        assert_eq!(json["openInIframe"], true);
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_invariants() {
        assert!(result().check_invariants().is_ok());

        let mut r = result();
        r.title = " ".into();
        assert!(r.check_invariants().is_err());

        let mut r = result();
        r.image_url = "/relative.png".into();
        assert!(r.check_invariants().is_err());

        let mut r = result();
        r.tags = vec!["a".into(), "A".into()];
        assert!(r.check_invariants().is_err());

        let mut r = result();
        r.tags = vec![];
        assert!(r.check_invariants().is_err());

        let mut r = result();
        r.tags = (0..9).map(|i| i.to_string()).collect();
        assert!(r.check_invariants().is_err());
    }
}
