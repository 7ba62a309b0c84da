use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use url::Url;

use crate::analysis::AnalysisResult;
use crate::fallback::strategy::{AnalysisStrategy, StrategyError};
use crate::model::ModelClient;
use crate::prompt;
use crate::validator::{self, ValidationContext};

/// Asks the model about the URL alone, without fetching the page.
///
/// Nothing was fetched, so embedding is assumed to be allowed.
#[derive(Clone)]
pub struct DirectModelStrategy {
    model: Arc<dyn ModelClient>,
}

impl DirectModelStrategy {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl AnalysisStrategy for DirectModelStrategy {
    fn name(&self) -> &'static str {
        "direct-model"
    }

    #[instrument(name = "direct_model_strategy", skip_all, fields(url = %url))]
    async fn analyze(&self, url: &Url) -> Result<AnalysisResult, StrategyError> {
        let prompt = prompt::build_url_only(url);
        let raw = self.model.invoke(&prompt).await?;
        let result = validator::validate(&raw, &ValidationContext::url_only(url))?;
        Ok(result)
    }
}
