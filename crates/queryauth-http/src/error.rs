//! HTTP layer error types.

use queryauth_guard::GuardError;

/// Failure reported by a [`ProtectedHandler`](crate::ProtectedHandler).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Create a handler error with a message safe to show to the caller.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Faults surfaced as JSend `error` responses.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The request body could not be read.
    #[error("failed to read request body: {0}")]
    BadRequest(String),

    /// The replay guard could not reach its ledger.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// The protected handler failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl HttpError {
    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::BadRequest(_) => http::StatusCode::BAD_REQUEST,
            Self::Guard(_) | Self::Handler(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for the envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Guard(err) => err.code(),
            Self::Handler(_) => "handler_error",
        }
    }
}
