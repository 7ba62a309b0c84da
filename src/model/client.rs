use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, header};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use crate::model::errors::ModelError;
use crate::model::fences::strip_code_fences;
use crate::model::types::{
    ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use crate::prompt::Prompt;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
const TEMPERATURE: f64 = 0.2;

/// Sends a prompt to a generative model and returns its raw JSON text.
///
/// Implementations strip surrounding code fences; the text is otherwise
/// unvalidated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, prompt: &Prompt) -> Result<String, ModelError>;
}

/// `generateContent` client for Gemini-compatible endpoints.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ModelError::Config("API key is empty".into()));
        }

        let http_client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point at a proxy or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(prompt: &Prompt) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Some(Content::text(None, prompt.system.clone())),
            contents: vec![Content::text(Some("user"), prompt.user.clone())],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json".to_string(),
                response_json_schema: prompt.schema.clone(),
            },
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model, variant = ?prompt.variant))]
    async fn invoke(&self, prompt: &Prompt) -> Result<String, ModelError> {
        let start = Instant::now();

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "model request failed");
                ModelError::from_reqwest(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&error_text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(error_text);
            warn!(status = %status, error = %message, "model API error");
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;

        let text = body.first_text().ok_or(ModelError::Empty)?;
        let json = strip_code_fences(&text);
        if json.is_empty() {
            return Err(ModelError::Empty);
        }

        debug!(
            duration_ms = start.elapsed().as_millis(),
            chars = json.chars().count(),
            "model responded"
        );

        Ok(json.to_string())
    }
}
