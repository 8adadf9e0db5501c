//! Error types for the Cuttlefish gateway

use crate::types::ExchangeId;

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for the Cuttlefish gateway
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A protocol element could not be mapped between HTTP and CoAP.
    ///
    /// The display form is the bare message so callers can match on it.
    #[error("{0}")]
    Translation(String),

    /// An exchange id was registered twice. This is a defect, not a
    /// runtime condition.
    #[error("Exchange {0} is already registered")]
    DuplicateExchange(ExchangeId),

    /// An option value does not match the option's fixed format
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// HTTP-related errors
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// Invalid HTTP request
    #[error("Invalid HTTP request: {0}")]
    InvalidRequest(String),

    /// Upstream connection error
    #[error("Failed to connect to upstream: {0}")]
    UpstreamConnection(String),

    /// Upstream timeout
    #[error("Upstream request timed out")]
    UpstreamTimeout,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Runtime error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP builder error
    #[error("HTTP error: {0}")]
    HttpError(#[from] http::Error),

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convert error to HTTP status code
    pub fn to_status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Translation(_) => StatusCode::BAD_GATEWAY,
            Error::Http(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::UpstreamConnection(_) => StatusCode::BAD_GATEWAY,
            Error::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Create a translation error
    pub fn translation(message: impl Into<String>) -> Self {
        Error::Translation(message.into())
    }

    /// Whether this error came out of protocol translation
    pub fn is_translation(&self) -> bool {
        matches!(self, Error::Translation(_))
    }
}
