pub mod errors;
pub mod orchestrator;
pub mod request;
pub mod result;

pub use errors::{AnalysisError, ErrorKind, SetupError, Stage};
pub use orchestrator::Analyzer;
pub use request::{AnalysisRequest, UrlError, canonical, normalize_url};
pub use result::AnalysisResult;
