//! Turns raw model text into an [`AnalysisResult`] or says exactly why it can't.

pub mod placeholder;
pub mod tags;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::analysis::{AnalysisResult, request::canonical};
use crate::embed::EmbedPolicy;
use crate::extractor::model::collapse_whitespace;

pub use placeholder::{placeholder_for_seed, placeholder_image};
pub use tags::{MAX_TAGS, host_tag, normalize_tags};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("model response is not a JSON object: {0}")]
    MalformedJson(String),

    #[error("model response is missing `{0}`")]
    MissingField(&'static str),
}

/// Everything the validator needs besides the model text itself.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// The normalized request URL.
    pub url: &'a Url,
    pub candidate_images: &'a [String],
    pub embed: EmbedPolicy,
}

impl<'a> ValidationContext<'a> {
    /// Context for results that were not grounded in a fetched page.
    pub fn url_only(url: &'a Url) -> Self {
        Self {
            url,
            candidate_images: &[],
            embed: EmbedPolicy::ALLOWED,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ModelOutput {
    title: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
    #[serde(rename = "imageUrl", alias = "image_url")]
    image_url: Option<serde_json::Value>,
}

/// Parse and normalize a model response.
///
/// `openInIframe` always comes from the context; anything the model says
/// about embedding is ignored.
pub fn validate(raw: &str, ctx: &ValidationContext<'_>) -> Result<AnalysisResult, ValidationError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ValidationError::MalformedJson(e.to_string()))?;
    if !value.is_object() {
        return Err(ValidationError::MalformedJson(format!(
            "expected an object, got {}",
            json_kind(&value)
        )));
    }

    let output: ModelOutput =
        serde_json::from_value(value).map_err(|e| ValidationError::MalformedJson(e.to_string()))?;

    let title = required_text(output.title, "title")?;
    let description = required_text(output.description, "description")?;
    let raw_tags = output.tags.ok_or(ValidationError::MissingField("tags"))?;
    let tags = normalize_tags(&raw_tags, ctx.url);

    let image_url = output
        .image_url
        .as_ref()
        .and_then(|value| value.as_str())
        .and_then(absolute_http_url)
        .or_else(|| ctx.candidate_images.iter().find_map(|src| absolute_http_url(src)))
        .unwrap_or_else(|| placeholder_image(ctx.url));

    debug!(tags = tags.len(), image_url = %image_url, "model response validated");

    Ok(AnalysisResult {
        url: canonical(ctx.url),
        title,
        description,
        image_url,
        tags,
        open_in_iframe: ctx.embed.allowed,
    })
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .map(|text| collapse_whitespace(&text))
        .filter(|text| !text.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

fn absolute_http_url(candidate: &str) -> Option<String> {
    let url = Url::parse(candidate.trim()).ok()?;
    (matches!(url.scheme(), "http" | "https") && url.host_str().is_some()).then(|| url.to_string())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
