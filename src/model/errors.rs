use thiserror::Error;

/// Failures talking to the generative model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Missing API key or an unusable client setting
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model request timed out")]
    Timeout,

    /// Non-2xx answer from the model API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model answered but produced no text
    #[error("Model returned an empty response")]
    Empty,

    /// The API envelope could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ModelError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout
        } else {
            ModelError::Network(err.to_string())
        }
    }
}
