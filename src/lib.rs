pub mod analysis;
pub mod api;
pub mod app_state;
pub mod config;
pub mod embed;
pub mod extractor;
pub mod fallback;
pub mod fetcher;
pub mod health;
pub mod middleware;
pub mod model;
pub mod prompt;
pub mod telemetry;
pub mod validator;

pub use analysis::{AnalysisError, AnalysisRequest, AnalysisResult, Analyzer};
pub use fallback::FallbackChain;
