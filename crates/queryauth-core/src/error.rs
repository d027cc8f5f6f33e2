//! Error types for the QueryAuth core.

/// Core error type for QueryAuth infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum QueryAuthError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for QueryAuth operations.
pub type QueryAuthResult<T> = Result<T, QueryAuthError>;
