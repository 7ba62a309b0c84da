use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, instrument};
use url::Url;

use crate::analysis::{AnalysisRequest, AnalysisResult, SetupError, canonical};
use crate::fallback::strategy::{AnalysisStrategy, StrategyError};

/// Delegates to a deployed analysis service (`POST {url}` → `AnalysisResult`).
#[derive(Debug, Clone)]
pub struct RemoteStrategy {
    client: Client,
    endpoint: Url,
}

impl RemoteStrategy {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, SetupError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| SetupError::Remote(e.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl AnalysisStrategy for RemoteStrategy {
    fn name(&self) -> &'static str {
        "remote"
    }

    #[instrument(name = "remote_strategy", skip_all, fields(url = %url, endpoint = %self.endpoint))]
    async fn analyze(&self, url: &Url) -> Result<AnalysisResult, StrategyError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&AnalysisRequest::new(canonical(url)))
            .send()
            .await
            .map_err(StrategyError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StrategyError::Status(status.as_u16()));
        }

        let result: AnalysisResult = response
            .json()
            .await
            .map_err(|e| StrategyError::Malformed(e.to_string()))?;
        result.check_invariants().map_err(StrategyError::Invariant)?;

        debug!(title = %result.title, "remote analysis succeeded");
        Ok(result)
    }
}
