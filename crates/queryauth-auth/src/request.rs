//! Request adapter traits.
//!
//! The signer and validator never touch a concrete HTTP type. Whatever
//! framework wraps the request implements one of these traits.

use queryauth_core::ParameterSet;

use crate::error::AuthError;

/// Whether parameters for `method` travel in the form body rather than the
/// query string.
///
/// `POST` requests carry their parameters in an
/// `application/x-www-form-urlencoded` body. Every other method uses the
/// query string.
#[must_use]
pub fn uses_body_parameters(method: &str) -> bool {
    method.eq_ignore_ascii_case("POST")
}

/// A request about to be sent, which the signer can rewrite.
pub trait OutgoingRequest {
    /// The HTTP method.
    fn method(&self) -> &str;

    /// The host the request is addressed to, without port.
    fn host(&self) -> &str;

    /// The request path.
    fn path(&self) -> &str;

    /// The parameters to sign (form body for `POST`, query string otherwise).
    fn parameters(&self) -> ParameterSet;

    /// Replace the request's parameters with the signed set.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RequestRewrite`] if the request cannot carry the
    /// signed parameters.
    fn set_parameters(&mut self, parameters: ParameterSet) -> Result<(), AuthError>;
}

/// A received request, which the validator reads.
pub trait IncomingRequest {
    /// The HTTP method.
    fn method(&self) -> &str;

    /// The host the request was addressed to, without port.
    fn host(&self) -> &str;

    /// The request path.
    fn path(&self) -> &str;

    /// Decoded query string parameters.
    fn query_parameters(&self) -> ParameterSet;

    /// Decoded form body parameters.
    fn body_parameters(&self) -> ParameterSet;

    /// The parameter set that was signed, selected by method.
    fn parameters(&self) -> ParameterSet {
        if uses_body_parameters(self.method()) {
            self.body_parameters()
        } else {
            self.query_parameters()
        }
    }
}
