use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::analysis::{AnalysisError, AnalysisRequest, AnalysisResult, ErrorKind, Stage};
use crate::api::dtos::ErrorResponse;
use crate::app_state::AppState;

#[utoipa::path(
    post,
    path = "/v1/analyze",
    tag = "analysis",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Bookmark metadata for the URL", body = AnalysisResult),
        (status = 400, description = "Malformed URL, unreachable site or error status", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Model call or response validation failed", body = ErrorResponse),
        (status = 504, description = "The site did not answer in time", body = ErrorResponse)
    )
)]
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AnalysisError> {
    let Json(request) = payload.map_err(unreadable_request)?;
    state.analyzer.analyze(request).await.map(Json)
}

/// A body without a usable `url` string is a malformed URL as far as callers care.
fn unreadable_request(rejection: JsonRejection) -> AnalysisError {
    AnalysisError::new(Stage::ValidatingUrl, ErrorKind::InvalidUrl, rejection.body_text())
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let (status, error) = match &self.kind {
            ErrorKind::InvalidUrl => (
                StatusCode::BAD_REQUEST,
                format!("The URL is malformed: {}", self.message),
            ),
            ErrorKind::FetchUnreachable => (
                StatusCode::BAD_REQUEST,
                format!("Could not reach the domain: {}", self.message),
            ),
            ErrorKind::FetchTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                format!("Could not reach the domain: {}", self.message),
            ),
            ErrorKind::FetchRejected(code) => (
                StatusCode::BAD_REQUEST,
                format!("The site responded with status {code}"),
            ),
            ErrorKind::ModelUnavailable
            | ErrorKind::MalformedModelResponse
            | ErrorKind::MissingField(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Analysis failed, please try again".to_string(),
            ),
        };

        warn!(stage = %self.stage, kind = ?self.kind, cause = %self.message, status = %status, "analysis failed");
        (status, Json(ErrorResponse::new(error))).into_response()
    }
}
