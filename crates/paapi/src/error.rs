//! Error types for the PA API client
//!
//! Every failure is classified into an [`ErrorCategory`] so callers can
//! tell rejected credentials apart from rejected calls and from an
//! unreachable service.

use reqwest::StatusCode;
use thiserror::Error;

/// Boxed source error raised by an [`HttpTransport`](crate::http::HttpTransport).
pub type TransportSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Categories of PA API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The identity provider rejected the credentials. Retrying with the
    /// same credentials will not help.
    Authentication,
    /// The API (or the identity provider, for non-credential reasons)
    /// answered with a failure status or an unexpected body
    Request,
    /// The service could not be reached
    Transport,
    /// A request body could not be encoded; nothing was sent
    Serialization,
    /// Invalid configuration
    Config,
}

/// PA API operation errors
#[derive(Debug, Error)]
pub enum PaApiError {
    #[error("Authentication failed with status {status}: {body}")]
    Authentication { status: StatusCode, body: String },

    #[error("{url} returned status {status}{}", body_suffix(.body))]
    Request { status: StatusCode, url: String, body: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Transport error: {0}")]
    Transport(#[source] TransportSource),

    #[error("Failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(": {body}"),
        None => String::new(),
    }
}

impl PaApiError {
    /// Wrap a transport failure, keeping the original error as the source.
    pub fn transport(err: impl Into<TransportSource>) -> Self {
        Self::Transport(err.into())
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Request { .. } | Self::InvalidResponse(_) => ErrorCategory::Request,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    /// True when the credentials themselves were rejected
    pub fn is_authentication(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }

    /// True when the remote side answered but the call failed
    pub fn is_request_error(&self) -> bool {
        self.category() == ErrorCategory::Request
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Authentication { status, .. } | Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PaApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err)
    }
}

impl From<url::ParseError> for PaApiError {
    fn from(err: url::ParseError) -> Self {
        Self::Config(format!("Invalid URL: {err}"))
    }
}

/// Result type alias for PA API operations
pub type Result<T> = std::result::Result<T, PaApiError>;
