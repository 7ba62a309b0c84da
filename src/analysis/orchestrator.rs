use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::analysis::errors::{AnalysisError, SetupError, Stage};
use crate::analysis::request::{AnalysisRequest, normalize_url};
use crate::analysis::result::AnalysisResult;
use crate::config::Config;
use crate::embed;
use crate::extractor;
use crate::fetcher::Fetcher;
use crate::model::{GeminiClient, ModelClient};
use crate::prompt;
use crate::validator::{self, ValidationContext};

/// Runs the fetch → extract → classify → prompt → model → validate pipeline.
///
/// Holds no per-request state; one instance serves concurrent requests.
#[derive(Clone)]
pub struct Analyzer {
    fetcher: Fetcher,
    model: Option<Arc<dyn ModelClient>>,
}

impl Analyzer {
    pub fn new(fetcher: Fetcher, model: Option<Arc<dyn ModelClient>>) -> Self {
        Self { fetcher, model }
    }

    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let fetcher = Fetcher::new(config.fetch_timeout(), config.allow_private_hosts())?;
        let model = gemini_from_config(config)?.map(|client| Arc::new(client) as Arc<dyn ModelClient>);
        Ok(Self::new(fetcher, model))
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Analyze one URL. Fails at the first stage that fails; nothing is retried.
    #[instrument(name = "analyze", skip_all, fields(url = %request.url))]
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        debug!(stage = %Stage::ValidatingUrl);
        let url = normalize_url(&request.url)?;

        debug!(stage = %Stage::Fetching, url = %url);
        let page = self.fetcher.fetch(url.as_str()).await?;
        if page.status.is_client_error() || page.status.is_server_error() {
            return Err(AnalysisError::rejected(page.status.as_u16()));
        }

        debug!(stage = %Stage::Extracting, final_url = %page.url_final);
        let metadata = extractor::extract(&page);

        debug!(stage = %Stage::Classifying);
        let embed = embed::classify(&page.headers);

        debug!(stage = %Stage::Prompting);
        let prompt = prompt::build(&metadata, &url);

        debug!(stage = %Stage::InvokingModel);
        let model = self.model.as_ref().ok_or_else(AnalysisError::model_missing)?;
        let raw = model.invoke(&prompt).await?;

        debug!(stage = %Stage::ValidatingResponse);
        let ctx = ValidationContext {
            url: &url,
            candidate_images: &metadata.candidate_images,
            embed,
        };
        let result = validator::validate(&raw, &ctx)?;

        info!(stage = %Stage::Done, tags = result.tags.len(), open_in_iframe = result.open_in_iframe, "analysis complete");
        Ok(result)
    }
}

/// A Gemini client when an API key is configured.
pub fn gemini_from_config(config: &Config) -> Result<Option<GeminiClient>, SetupError> {
    config
        .gemini_api_key()
        .map(|key| {
            GeminiClient::new(key, config.gemini_model(), config.model_timeout())
                .map(|client| client.with_base_url(config.gemini_base_url()))
        })
        .transpose()
        .map_err(SetupError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::errors::ErrorKind;
    use crate::model::{MockModelClient, ModelError};
    use crate::prompt::Prompt;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head>
        <meta property="og:title" content="Widgets Inc">
        <meta property="og:image" content="/cover.png">
        </head><body><article><p>We build widgets for every occasion.</p></article></body></html>"#;

    const MODEL_JSON: &str = r#"{"title":"Widgets Inc","description":"A widget maker.","tags":["Widgets","shop","widgets"]}"#;

    fn fetcher() -> Fetcher {
        Fetcher::new(Duration::from_secs(2), true).unwrap()
    }

    fn analyzer(model: MockModelClient) -> Analyzer {
        Analyzer::new(fetcher(), Some(Arc::new(model)))
    }

    async fn page_server(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_analyze_happy_path() {
        let server = page_server(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .insert_header("x-frame-options", "SAMEORIGIN")
                .set_body_string(PAGE),
        )
        .await;

        let mut model = MockModelClient::new();
        model
            .expect_invoke()
            .withf(|prompt: &Prompt| prompt.user.contains("Extracted title: Widgets Inc"))
            .times(1)
            .returning(|_| Ok(MODEL_JSON.to_string()));

        let url = format!("{}/page", server.uri());
        let result = analyzer(model)
            .analyze(AnalysisRequest::new(url.clone()))
            .await
            .unwrap();

        assert_eq!(result.url, url);
        assert_eq!(result.title, "Widgets Inc");
        assert_eq!(result.tags, vec!["widgets", "shop"]);
        assert_eq!(result.image_url, format!("{}/cover.png", server.uri()));
        assert!(!result.open_in_iframe);
        assert!(result.check_invariants().is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_fetching() {
        let mut model = MockModelClient::new();
        model.expect_invoke().times(0);

        let err = analyzer(model)
            .analyze(AnalysisRequest::new("ftp://example.com"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::ValidatingUrl);
        assert_eq!(err.kind, ErrorKind::InvalidUrl);
    }

    #[tokio::test]
    async fn test_error_status_is_rejected() {
        let server = page_server(ResponseTemplate::new(404).set_body_string("<h1>Not Found</h1>")).await;
        let mut model = MockModelClient::new();
        model.expect_invoke().times(0);

        let err = analyzer(model)
            .analyze(AnalysisRequest::new(format!("{}/page", server.uri())))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Fetching);
        assert_eq!(err.kind, ErrorKind::FetchRejected(404));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = page_server(
            ResponseTemplate::new(200)
                .set_body_string(PAGE)
                .set_delay(Duration::from_secs(2)),
        )
        .await;
        let analyzer = Analyzer::new(
            Fetcher::new(Duration::from_millis(200), true).unwrap(),
            None,
        );

        let err = analyzer
            .analyze(AnalysisRequest::new(format!("{}/page", server.uri())))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::FetchTimeout);
    }

    #[tokio::test]
    async fn test_missing_model_fails_at_model_stage() {
        let server = page_server(ResponseTemplate::new(200).set_body_string(PAGE)).await;
        let analyzer = Analyzer::new(fetcher(), None);
        assert!(!analyzer.has_model());

        let err = analyzer
            .analyze(AnalysisRequest::new(format!("{}/page", server.uri())))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::InvokingModel);
        assert_eq!(err.kind, ErrorKind::ModelUnavailable);
    }

    #[tokio::test]
    async fn test_model_failures_are_typed() {
        let server = page_server(ResponseTemplate::new(200).set_body_string(PAGE)).await;
        let url = format!("{}/page", server.uri());

        let mut unavailable = MockModelClient::new();
        unavailable.expect_invoke().returning(|_| Err(ModelError::Timeout));
        let err = analyzer(unavailable)
            .analyze(AnalysisRequest::new(url.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModelUnavailable);

        let mut incomplete = MockModelClient::new();
        incomplete
            .expect_invoke()
            .returning(|_| Ok(r#"{"title":"T","tags":[]}"#.to_string()));
        let err = analyzer(incomplete)
            .analyze(AnalysisRequest::new(url.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingField("description"));
        assert_eq!(err.stage, Stage::ValidatingResponse);

        let mut garbage = MockModelClient::new();
        garbage.expect_invoke().returning(|_| Ok("Sure! Here you go".to_string()));
        let err = analyzer(garbage)
            .analyze(AnalysisRequest::new(url))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedModelResponse);
    }

    #[test]
    fn test_from_config_without_key_has_no_model() {
        let analyzer = Analyzer::from_config(&Config::default()).unwrap();
        assert!(!analyzer.has_model());

        let analyzer = Analyzer::from_config(&Config::default().with_gemini_api_key("key")).unwrap();
        assert!(analyzer.has_model());
    }
}
