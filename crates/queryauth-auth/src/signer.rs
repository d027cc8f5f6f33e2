//! Consumer-side request signing.
//!
//! 1. Reject empty credentials.
//! 2. Add `key` and `timestamp` to the caller's parameters.
//! 3. Build the base string with [`build_base_string`].
//! 4. `signature = base64(HMAC-SHA256(secret, base_string))`.
//!
//! The main entry points are [`sign`] and [`sign_request`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, KeyInit, Mac};
use queryauth_core::{Credentials, ParameterSet, UnixTimestamp};
use sha2::Sha256;
use tracing::debug;

use crate::canonical::build_base_string;
use crate::error::AuthError;
use crate::request::OutgoingRequest;
use crate::{KEY_PARAM, SIGNATURE_PARAM, TIMESTAMP_PARAM};

type HmacSha256 = Hmac<Sha256>;

/// Sign a parameter set using the current wall-clock time.
///
/// Returns the original parameters plus `key`, `timestamp` and `signature`.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] if the key or secret is empty.
pub fn sign(
    credentials: &Credentials,
    method: &str,
    host: &str,
    path: &str,
    parameters: &ParameterSet,
) -> Result<ParameterSet, AuthError> {
    sign_at(
        credentials,
        method,
        host,
        path,
        parameters,
        Utc::now().timestamp(),
    )
}

/// Sign a parameter set as of `now` (epoch seconds).
///
/// A `signature` already present in `parameters` is discarded.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] if the key or secret is empty.
///
/// # Examples
///
/// ```
/// use queryauth_auth::sign_at;
/// use queryauth_core::{Credentials, ParameterSet};
///
/// let creds = Credentials::new("k1", "s1");
/// let signed = sign_at(&creds, "GET", "example.test", "/", &ParameterSet::new(), 1_700_000_000)
///     .unwrap();
/// assert_eq!(signed.get("key"), Some("k1"));
/// assert_eq!(signed.get("timestamp"), Some("1700000000"));
/// assert!(signed.get("signature").is_some());
/// ```
pub fn sign_at(
    credentials: &Credentials,
    method: &str,
    host: &str,
    path: &str,
    parameters: &ParameterSet,
    now: UnixTimestamp,
) -> Result<ParameterSet, AuthError> {
    if credentials.key().is_empty() || credentials.secret().is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    let mut signed = parameters.clone();
    signed.remove(SIGNATURE_PARAM);
    signed.insert(KEY_PARAM, credentials.key());
    signed.insert(TIMESTAMP_PARAM, now.to_string());

    let base_string = build_base_string(method, host, path, &signed);
    let signature = compute_signature(credentials.secret(), &base_string);

    debug!(
        api_key = credentials.key(),
        method,
        host,
        path,
        timestamp = now,
        "Signed request"
    );

    signed.insert(SIGNATURE_PARAM, signature);
    Ok(signed)
}

/// Sign an outgoing request in place.
///
/// Reads the method, host, path and parameters from the adapter and writes
/// the signed parameter set back.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] if the key or secret is empty,
/// or [`AuthError::RequestRewrite`] if the adapter cannot store the signed
/// parameters.
pub fn sign_request<R: OutgoingRequest + ?Sized>(
    credentials: &Credentials,
    request: &mut R,
) -> Result<(), AuthError> {
    let signed = sign(
        credentials,
        request.method(),
        request.host(),
        request.path(),
        &request.parameters(),
    )?;
    request.set_parameters(signed)
}

/// Compute the base64-encoded HMAC-SHA256 of `base_string` keyed by `secret`.
#[must_use]
pub fn compute_signature(secret: &str, base_string: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can accept keys of any length");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}
