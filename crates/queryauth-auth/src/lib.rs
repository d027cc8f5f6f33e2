//! Query-string request signing and signature validation for QueryAuth.
//!
//! A consumer signs a request by adding `key`, `timestamp` and `signature`
//! parameters to its query string (or form body). A provider recomputes the
//! signature with the shared secret and compares the two in constant time.
//!
//! # Usage
//!
//! ```rust
//! use queryauth_auth::{Validator, sign_at};
//! use queryauth_core::{Credentials, ParameterSet};
//!
//! let creds = Credentials::new("k1", "s1");
//! let signed = sign_at(&creds, "GET", "example.test", "/api/get-example", &ParameterSet::new(), 1_700_000_000)
//!     .unwrap();
//!
//! let validator = Validator::new(300);
//! assert!(validator.validate_at("s1", "GET", "example.test", "/api/get-example", &signed, 1_700_000_000));
//! assert!(!validator.validate_at("s1", "GET", "example.test", "/api/get-example", &signed, 1_700_000_301));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Signing base string construction
//! - [`credentials`] - Credential provider trait and in-memory implementation
//! - [`error`] - Authentication error types
//! - [`request`] - Incoming and outgoing request adapter traits
//! - [`signer`] - Consumer-side signing
//! - [`validator`] - Provider-side validation

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod request;
pub mod signer;
pub mod validator;

pub use credentials::{CredentialProvider, StaticCredentialProvider};
pub use error::AuthError;
pub use request::{IncomingRequest, OutgoingRequest};
pub use signer::{sign, sign_at, sign_request};
pub use validator::{VerifiedRequest, Validator};

/// Name of the parameter carrying the caller's API key.
pub const KEY_PARAM: &str = "key";

/// Name of the parameter carrying the signing time in epoch seconds.
pub const TIMESTAMP_PARAM: &str = "timestamp";

/// Name of the parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "signature";
