//! Error types for request signing and validation.
//!
//! Every validation failure is an [`AuthError`] variant. Callers that expose
//! results to API consumers collapse all of them into a single "invalid
//! signature" answer; the variant is for logs.

/// Errors that can occur while signing or validating a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The API key or secret is empty.
    #[error("API key and secret must not be empty")]
    InvalidCredentials,

    /// The request carries no `signature` parameter.
    #[error("Missing signature parameter")]
    MissingSignature,

    /// A required protocol parameter other than `signature` is missing.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// The `timestamp` parameter is not an integer.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The request timestamp lies outside the allowed clock-skew window.
    #[error("Request has expired")]
    ExpiredRequest,

    /// The computed signature does not match the provided signature.
    #[error("Signature does not match")]
    SignatureMismatch,

    /// The API key was not found in the credential store.
    #[error("API key not found: {0}")]
    AccessKeyNotFound(String),

    /// The signed parameters could not be written back to the request.
    #[error("Failed to rewrite signed request: {0}")]
    RequestRewrite(String),
}
