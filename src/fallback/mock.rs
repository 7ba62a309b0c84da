use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;
use url::Url;

use crate::analysis::{AnalysisResult, canonical};
use crate::fallback::strategy::{AnalysisStrategy, StrategyError};
use crate::validator::{host_tag, normalize_tags, placeholder_for_seed, placeholder_image};

pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);
const DESCRIPTION: &str =
    "Saved link. A summary could not be generated for this page, so this placeholder was used instead.";

/// Deterministic last resort: same URL, same result, after a short delay.
#[derive(Debug, Clone)]
pub struct MockStrategy {
    delay: Duration,
}

impl MockStrategy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn result_for(&self, url: &Url) -> AnalysisResult {
        let host = host_tag(url);
        AnalysisResult {
            url: canonical(url),
            title: title_from_host(&host),
            description: DESCRIPTION.to_string(),
            image_url: placeholder_image(url),
            tags: normalize_tags(&[host.as_str(), "bookmark", "web"], url),
            open_in_iframe: true,
        }
    }

    /// Input that could not be parsed as a URL is echoed back as-is.
    pub fn result_for_raw(&self, raw: &str) -> AnalysisResult {
        let raw = raw.trim();
        AnalysisResult {
            url: raw.to_string(),
            title: "Untitled".to_string(),
            description: DESCRIPTION.to_string(),
            image_url: placeholder_for_seed(raw),
            tags: vec!["bookmark".to_string(), "web".to_string()],
            open_in_iframe: true,
        }
    }

    pub async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl Default for MockStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl AnalysisStrategy for MockStrategy {
    fn name(&self) -> &'static str {
        "mock"
    }

    #[instrument(name = "mock_strategy", skip_all, fields(url = %url))]
    async fn analyze(&self, url: &Url) -> Result<AnalysisResult, StrategyError> {
        self.wait().await;
        Ok(self.result_for(url))
    }
}

/// `"rust-lang.org"` → `"Rust-lang"`.
fn title_from_host(host: &str) -> String {
    let label = host.split('.').next().unwrap_or(host);
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Untitled".to_string(),
    }
}
