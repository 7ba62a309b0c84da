//! Decide whether a page may be shown inside an iframe.

use reqwest::header::{CONTENT_SECURITY_POLICY, HeaderMap, X_FRAME_OPTIONS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedPolicy {
    pub allowed: bool,
}

impl EmbedPolicy {
    pub const ALLOWED: Self = Self { allowed: true };
    pub const DENIED: Self = Self { allowed: false };
}

impl Default for EmbedPolicy {
    fn default() -> Self {
        Self::ALLOWED
    }
}

/// Embedding is allowed unless `X-Frame-Options` is `DENY`/`SAMEORIGIN` or the
/// CSP `frame-ancestors` directive is exactly `'none'` or `'self'`.
pub fn classify(headers: &HeaderMap) -> EmbedPolicy {
    let frame_options_deny = headers
        .get_all(X_FRAME_OPTIONS)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| {
            let value = value.trim();
            value.eq_ignore_ascii_case("DENY") || value.eq_ignore_ascii_case("SAMEORIGIN")
        });

    let csp_deny = headers
        .get_all(CONTENT_SECURITY_POLICY)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(frame_ancestors_restricted);

    if frame_options_deny || csp_deny {
        EmbedPolicy::DENIED
    } else {
        EmbedPolicy::ALLOWED
    }
}

fn frame_ancestors_restricted(policy: &str) -> bool {
    policy.split(';').any(|directive| {
        let mut tokens = directive.split_whitespace();
        let is_frame_ancestors = tokens
            .next()
            .is_some_and(|name| name.eq_ignore_ascii_case("frame-ancestors"));
        if !is_frame_ancestors {
            return false;
        }
        let sources: Vec<&str> = tokens.collect();
        matches!(sources.as_slice(), [source] if source.eq_ignore_ascii_case("'none'") || source.eq_ignore_ascii_case("'self'"))
    })
}
