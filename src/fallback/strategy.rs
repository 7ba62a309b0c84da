use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::analysis::AnalysisResult;
use crate::model::ModelError;
use crate::validator::ValidationError;

/// One way of producing an [`AnalysisResult`] for a URL.
#[async_trait]
pub trait AnalysisStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn analyze(&self, url: &Url) -> Result<AnalysisResult, StrategyError>;
}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("endpoint answered with status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("result rejected: {0}")]
    Invariant(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StrategyError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StrategyError::Timeout
        } else {
            StrategyError::Transport(err.to_string())
        }
    }
}
