use anyhow::Context;
use clap::Parser;
use linkmark::{FallbackChain, config::Config, telemetry};
use tracing::debug;

/// Summarize a URL as bookmark metadata.
///
/// Tries the remote analysis service (ANALYZE_ENDPOINT), then the model
/// directly (GEMINI_API_KEY), then a placeholder. Always prints a result.
#[derive(Debug, Parser)]
#[command(name = "linkmark", version)]
struct Cli {
    /// URL to analyze; a bare domain is treated as https.
    url: String,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    telemetry::init(config.log_json());

    let chain = FallbackChain::from_config(&config).context("Failed to build fallback chain")?;
    debug!(strategies = ?chain.strategy_names(), "fallback chain ready");

    let result = chain.resolve(&cli.url).await;
    let output = if cli.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");

    Ok(())
}
