pub mod dtos;
pub mod handlers;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::analysis::{AnalysisRequest, AnalysisResult};
use crate::app_state::AppState;
use crate::health::{self, HealthResponse};
use crate::middleware::rate_limit::{RateLimit, rate_limit_middleware};

use dtos::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::analyze, health::health_check),
    components(schemas(AnalysisRequest, AnalysisResult, ErrorResponse, HealthResponse)),
    tags(
        (name = "analysis", description = "URL analysis"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// The full service: analysis and health routes, docs, tracing and request ids.
///
/// Analysis is rate limited per client IP; health and docs are not.
pub fn router(state: AppState, rate_limit: RateLimit) -> Router {
    let analysis = Router::new()
        .route("/v1/analyze", post(handlers::analyze))
        .route_layer(middleware::from_fn_with_state(rate_limit, rate_limit_middleware));

    Router::new()
        .merge(analysis)
        .route("/healthz", get(health::health_check))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
