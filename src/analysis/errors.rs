use std::fmt;

use thiserror::Error;

use crate::analysis::request::UrlError;
use crate::fetcher::FetchError;
use crate::model::ModelError;
use crate::validator::ValidationError;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidatingUrl,
    Fetching,
    Extracting,
    Classifying,
    Prompting,
    InvokingModel,
    ValidatingResponse,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ValidatingUrl => "validating url",
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Classifying => "classifying",
            Stage::Prompting => "prompting",
            Stage::InvokingModel => "invoking model",
            Stage::ValidatingResponse => "validating response",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    FetchTimeout,
    FetchUnreachable,
    /// The site answered with this HTTP status.
    FetchRejected(u16),
    ModelUnavailable,
    MalformedModelResponse,
    MissingField(&'static str),
}

/// A failed analysis: where it stopped, what kind of failure, and why.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{stage}: {message}")]
pub struct AnalysisError {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
}

impl AnalysisError {
    pub fn new(stage: Stage, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
        }
    }

    pub fn rejected(status: u16) -> Self {
        Self::new(
            Stage::Fetching,
            ErrorKind::FetchRejected(status),
            format!("site responded with status {status}"),
        )
    }

    pub fn model_missing() -> Self {
        Self::new(
            Stage::InvokingModel,
            ErrorKind::ModelUnavailable,
            "no model client is configured",
        )
    }
}

impl From<UrlError> for AnalysisError {
    fn from(err: UrlError) -> Self {
        Self::new(Stage::ValidatingUrl, ErrorKind::InvalidUrl, err.to_string())
    }
}

impl From<FetchError> for AnalysisError {
    fn from(err: FetchError) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::FetchTimeout
        } else if err.is_invalid_target() {
            ErrorKind::InvalidUrl
        } else {
            ErrorKind::FetchUnreachable
        };
        Self::new(Stage::Fetching, kind, err.to_string())
    }
}

impl From<ModelError> for AnalysisError {
    fn from(err: ModelError) -> Self {
        Self::new(Stage::InvokingModel, ErrorKind::ModelUnavailable, err.to_string())
    }
}

impl From<ValidationError> for AnalysisError {
    fn from(err: ValidationError) -> Self {
        let kind = match &err {
            ValidationError::MalformedJson(_) => ErrorKind::MalformedModelResponse,
            ValidationError::MissingField(field) => ErrorKind::MissingField(*field),
        };
        Self::new(Stage::ValidatingResponse, kind, err.to_string())
    }
}

/// Failures building the pipeline's collaborators from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("fetcher: {0}")]
    Fetcher(#[from] FetchError),

    #[error("model client: {0}")]
    Model(#[from] ModelError),

    #[error("remote endpoint client: {0}")]
    Remote(String),
}
