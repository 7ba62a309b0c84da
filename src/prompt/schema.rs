//! Output shapes requested from the model.
//!
//! The JSON schemas sent with each prompt are generated from these types so
//! the declared contract and the Rust definitions cannot drift apart.

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

/// Response shape for the page-content prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageSummary {
    /// Refined page title.
    pub title: String,
    /// One neutral paragraph summarising the page.
    pub description: String,
    /// Four or five lowercase topical tags.
    pub tags: Vec<String>,
}

/// Response shape for the URL-only prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UrlSummary {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Representative image, or an empty string when unknown.
    pub image_url: String,
}

/// Schema for `T` without the draft/title envelope model APIs reject.
pub fn schema_value<T: JsonSchema>() -> serde_json::Value {
    let mut value = serde_json::to_value(schema_for!(T)).unwrap_or_default();
    if let serde_json::Value::Object(map) = &mut value {
        map.remove("$schema");
        map.remove("title");
        map.remove("definitions");
    }
    value
}
