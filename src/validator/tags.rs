use std::collections::HashSet;

use url::Url;

pub const MAX_TAGS: usize = 8;
const FALLBACK_TAG: &str = "bookmark";

/// Trim, lowercase and de-duplicate model tags, keeping at most [`MAX_TAGS`].
///
/// When nothing usable survives, a single tag derived from the URL host is
/// returned instead.
pub fn normalize_tags<S: AsRef<str>>(raw: &[S], url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let tags: Vec<String> = raw
        .iter()
        .map(|tag| tag.as_ref().trim().trim_start_matches('#').trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .take(MAX_TAGS)
        .collect();

    if tags.is_empty() {
        vec![host_tag(url)]
    } else {
        tags
    }
}

/// The URL host without `www.`, lowercased; `"bookmark"` for host-less URLs.
pub fn host_tag(url: &Url) -> String {
    url.host_str()
        .map(|host| host.trim_start_matches("www.").to_lowercase())
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| FALLBACK_TAG.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://www.example.com/post").unwrap()
    }

    #[test]
    fn test_case_insensitive_dedup() {
        assert_eq!(normalize_tags(&["A", "a", "B"], &url()), vec!["a", "b"]);
    }

    #[test]
    fn test_trims_and_drops_empties() {
        assert_eq!(
            normalize_tags(&["  Rust ", "", "   ", "#async", "rust"], &url()),
            vec!["rust", "async"]
        );
    }

    #[test]
    fn test_capped_at_eight() {
        let raw: Vec<String> = (0..20).map(|i| format!("tag{i}")).collect();
        let tags = normalize_tags(&raw, &url());
        assert_eq!(tags.len(), MAX_TAGS);
        assert_eq!(tags[0], "tag0");
    }

    #[test]
    fn test_empty_input_synthesizes_host_tag() {
        let empty: [&str; 0] = [];
        assert_eq!(normalize_tags(&empty, &url()), vec!["example.com"]);
        assert_eq!(normalize_tags(&["  "], &url()), vec!["example.com"]);
    }

    #[test]
    fn test_host_tag_without_host() {
        let url = Url::parse("data:text/plain,hello").unwrap();
        assert_eq!(host_tag(&url), "bookmark");
    }

    #[cfg(feature = "fuzz")]
    mod fuzz {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_tags_are_bounded_unique_and_lowercase(
                raw in proptest::collection::vec(".{0,20}", 0..30)
            ) {
                let tags = normalize_tags(&raw, &url());
                prop_assert!(!tags.is_empty());
                prop_assert!(tags.len() <= MAX_TAGS);

                let unique: HashSet<String> = tags.iter().map(|t| t.to_lowercase()).collect();
                prop_assert_eq!(unique.len(), tags.len());
                for tag in &tags {
                    prop_assert!(!tag.trim().is_empty());
                    prop_assert_eq!(tag, &tag.to_lowercase());
                }
            }
        }
    }
}
