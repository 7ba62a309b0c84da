use std::net::SocketAddr;

use anyhow::Context;
use linkmark::{
    Analyzer, api, app_state::AppState, config::Config, middleware::rate_limit::RateLimit,
    telemetry,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    telemetry::init(config.log_json());

    let analyzer = Analyzer::from_config(&config).context("Failed to build analyzer")?;
    if !analyzer.has_model() {
        info!("GEMINI_API_KEY is not set; analysis requests will fail at the model stage");
    }

    let app = api::router(
        AppState::new(analyzer),
        RateLimit::per_minute(config.rate_limit_per_minute()),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr()))?;
    info!(addr = %config.bind_addr(), "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
