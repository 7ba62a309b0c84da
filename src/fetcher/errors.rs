use std::error::Error as _;

use thiserror::Error;

use crate::fetcher::guard::NonPublicResolution;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("refusing to fetch non-public host: {0}")]
    BlockedHost(String),

    #[error("dns failure: {0}")]
    Dns(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("redirect refused: {0}")]
    Redirect(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("unknown: {0}")]
    Unknown(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ConnectTimeout | Self::RequestTimeout)
    }

    /// The request never left the client because the target itself is unacceptable.
    pub fn is_invalid_target(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl(_) | Self::UnsupportedScheme(_) | Self::BlockedHost(_)
        )
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if let Some(refused) = refused_target(&err) {
            refused
        } else if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::Redirect(source_chain(&err))
        } else if err.is_connect() {
            let detail = source_chain(&err);
            if detail.contains("dns error") || detail.contains("failed to lookup address") {
                Self::Dns(detail)
            } else {
                Self::Connect(detail)
            }
        } else if err.is_body() || err.is_decode() {
            Self::Io(source_chain(&err))
        } else if err.is_request() {
            Self::Connect(source_chain(&err))
        } else {
            Self::Unknown(source_chain(&err))
        }
    }
}

/// A target refused by the guard, either while resolving a name or while
/// following a redirect, surfaces somewhere in reqwest's source chain.
fn refused_target(err: &reqwest::Error) -> Option<FetchError> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(resolution) = cause.downcast_ref::<NonPublicResolution>() {
            return Some(FetchError::BlockedHost(resolution.host.clone()));
        }
        match cause.downcast_ref::<FetchError>() {
            Some(FetchError::BlockedHost(host)) => return Some(FetchError::BlockedHost(host.clone())),
            Some(FetchError::UnsupportedScheme(scheme)) => {
                return Some(FetchError::UnsupportedScheme(scheme.clone()));
            }
            _ => {}
        }
        source = cause.source();
    }
    None
}

/// reqwest keeps the interesting part (resolver, socket) in the source chain.
fn source_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
