//! Client-side resolution that always yields a result.
//!
//! Strategies are tried in order (remote service, then the model directly)
//! and the deterministic mock answers when all of them fail.

pub mod direct;
pub mod mock;
pub mod remote;
pub mod strategy;

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::analysis::orchestrator::gemini_from_config;
use crate::analysis::{AnalysisResult, SetupError, normalize_url};
use crate::config::Config;
use crate::model::ModelClient;

pub use direct::DirectModelStrategy;
pub use mock::MockStrategy;
pub use remote::RemoteStrategy;
pub use strategy::{AnalysisStrategy, StrategyError};

pub struct FallbackChain {
    strategies: Vec<Box<dyn AnalysisStrategy>>,
    mock: MockStrategy,
}

impl FallbackChain {
    pub fn new(strategies: Vec<Box<dyn AnalysisStrategy>>, mock: MockStrategy) -> Self {
        Self { strategies, mock }
    }

    /// Remote when an endpoint is configured, direct model when a key is.
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let mut strategies: Vec<Box<dyn AnalysisStrategy>> = Vec::new();

        if let Some(endpoint) = config.analyze_endpoint() {
            let timeout = config.fetch_timeout() + config.model_timeout();
            strategies.push(Box::new(RemoteStrategy::new(endpoint.clone(), timeout)?));
        }
        if let Some(client) = gemini_from_config(config)? {
            let model: Arc<dyn ModelClient> = Arc::new(client);
            strategies.push(Box::new(DirectModelStrategy::new(model)));
        }

        Ok(Self::new(strategies, MockStrategy::new(config.mock_delay())))
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies
            .iter()
            .map(|strategy| strategy.name())
            .chain(std::iter::once(self.mock.name()))
            .collect()
    }

    /// Never fails: the first strategy with a well-formed result wins,
    /// otherwise the mock answers.
    #[instrument(skip_all, fields(url = %input))]
    pub async fn resolve(&self, input: &str) -> AnalysisResult {
        let url = match normalize_url(input) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "input is not a usable URL, answering with placeholder");
                self.mock.wait().await;
                return self.mock.result_for_raw(input);
            }
        };

        for strategy in &self.strategies {
            match strategy.analyze(&url).await {
                Ok(result) => match result.check_invariants() {
                    Ok(()) => {
                        info!(strategy = strategy.name(), "resolved");
                        return result;
                    }
                    Err(violation) => {
                        warn!(strategy = strategy.name(), violation = %violation, "discarding malformed result");
                    }
                },
                Err(e) => warn!(strategy = strategy.name(), error = %e, "strategy failed"),
            }
        }

        self.mock.wait().await;
        info!(strategy = self.mock.name(), "resolved");
        self.mock.result_for(&url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use url::Url;

    struct Failing(Arc<AtomicUsize>);

    #[async_trait]
    impl AnalysisStrategy for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn analyze(&self, _url: &Url) -> Result<AnalysisResult, StrategyError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(StrategyError::Timeout)
        }
    }

    struct Fixed(AnalysisResult);

    #[async_trait]
    impl AnalysisStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn analyze(&self, _url: &Url) -> Result<AnalysisResult, StrategyError> {
            Ok(self.0.clone())
        }
    }

    fn mock() -> MockStrategy {
        MockStrategy::new(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_all_failing_falls_back_to_mock() {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategies: Vec<Box<dyn AnalysisStrategy>> =
            vec![Box::new(Failing(calls.clone())), Box::new(Failing(calls.clone()))];
        let chain = FallbackChain::new(strategies, mock());

        let result = chain.resolve("example.com").await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.url, "https://example.com");
        assert_eq!(result.tags, vec!["example.com", "bookmark", "web"]);
        assert!(result.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn test_first_success_stops_the_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let url = Url::parse("https://example.com").unwrap();
        let mut good = mock().result_for(&url);
        good.title = "From first".into();

        let strategies: Vec<Box<dyn AnalysisStrategy>> =
            vec![Box::new(Fixed(good.clone())), Box::new(Failing(calls.clone()))];
        let chain = FallbackChain::new(strategies, mock());

        assert_eq!(chain.resolve("https://example.com").await, good);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invariant_violation_moves_on() {
        let url = Url::parse("https://example.com").unwrap();
        let mut bad = mock().result_for(&url);
        bad.tags.clear();

        let strategies: Vec<Box<dyn AnalysisStrategy>> = vec![Box::new(Fixed(bad))];
        let chain = FallbackChain::new(strategies, mock());
        let result = chain.resolve("https://example.com").await;
        assert_eq!(result, mock().result_for(&url));
    }

    #[tokio::test]
    async fn test_unparseable_input_still_resolves() {
        let chain = FallbackChain::new(vec![], mock());
        let result = chain.resolve("ftp://example.com").await;
        assert_eq!(result.url, "ftp://example.com");
        assert_eq!(result.title, "Untitled");
    }

    #[test]
    fn test_from_config_selects_strategies() {
        let chain = FallbackChain::from_config(&Config::default()).unwrap();
        assert_eq!(chain.strategy_names(), vec!["mock"]);

        let config = Config::default()
            .with_analyze_endpoint(Url::parse("https://api.example.com/v1/analyze").unwrap())
            .with_gemini_api_key("key");
        let chain = FallbackChain::from_config(&config).unwrap();
        assert_eq!(chain.strategy_names(), vec!["remote", "direct-model", "mock"]);
    }
}
