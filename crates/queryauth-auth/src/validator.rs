//! Provider-side signature validation.
//!
//! This module implements the verification flow:
//!
//! 1. Extract `signature`, `key` and `timestamp` from the parameters.
//! 2. Reject timestamps further than the skew window from the current time.
//! 3. Rebuild the base string from every parameter except `signature`.
//! 4. Recompute the MAC and compare it with the provided signature using
//!    constant-time comparison.
//!
//! [`Validator::verify_at`] reports the specific failure. [`Validator::validate`]
//! collapses the result to a boolean for callers that must not leak which
//! check failed.

use chrono::Utc;
use queryauth_core::{ParameterSet, QueryAuthConfig, UnixTimestamp};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::build_base_string;
use crate::error::AuthError;
use crate::request::IncomingRequest;
use crate::signer::compute_signature;
use crate::{KEY_PARAM, SIGNATURE_PARAM, TIMESTAMP_PARAM};

/// The protocol fields of a request whose signature checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedRequest {
    /// The API key that signed the request.
    pub api_key: String,
    /// The signature as it appeared on the wire.
    pub signature: String,
    /// The signing time in epoch seconds.
    pub timestamp: UnixTimestamp,
}

/// Validates signed requests against a shared secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    skew_window_secs: u64,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SKEW_WINDOW_SECS)
    }
}

impl Validator {
    /// Default maximum clock skew, in seconds.
    pub const DEFAULT_SKEW_WINDOW_SECS: u64 = 300;

    /// Create a validator with the given skew window.
    #[must_use]
    pub fn new(skew_window_secs: u64) -> Self {
        Self { skew_window_secs }
    }

    /// Create a validator from the service configuration.
    #[must_use]
    pub fn from_config(config: &QueryAuthConfig) -> Self {
        Self::new(config.skew_window_secs)
    }

    /// The skew window in seconds.
    #[must_use]
    pub fn skew_window_secs(&self) -> u64 {
        self.skew_window_secs
    }

    /// Whether the request is correctly signed, as of now.
    #[must_use]
    pub fn validate(
        &self,
        secret: &str,
        method: &str,
        host: &str,
        path: &str,
        parameters: &ParameterSet,
    ) -> bool {
        self.verify(secret, method, host, path, parameters).is_ok()
    }

    /// Whether the request is correctly signed, as of `now`.
    #[must_use]
    pub fn validate_at(
        &self,
        secret: &str,
        method: &str,
        host: &str,
        path: &str,
        parameters: &ParameterSet,
        now: UnixTimestamp,
    ) -> bool {
        self.verify_at(secret, method, host, path, parameters, now)
            .is_ok()
    }

    /// Whether an incoming request is correctly signed, as of now.
    #[must_use]
    pub fn validate_request<R: IncomingRequest + ?Sized>(&self, secret: &str, request: &R) -> bool {
        self.verify_request_at(secret, request, Utc::now().timestamp())
            .is_ok()
    }

    /// Verify a request as of now, reporting why it failed.
    pub fn verify(
        &self,
        secret: &str,
        method: &str,
        host: &str,
        path: &str,
        parameters: &ParameterSet,
    ) -> Result<VerifiedRequest, AuthError> {
        self.verify_at(
            secret,
            method,
            host,
            path,
            parameters,
            Utc::now().timestamp(),
        )
    }

    /// Verify an incoming request as of `now`, reporting why it failed.
    pub fn verify_request_at<R: IncomingRequest + ?Sized>(
        &self,
        secret: &str,
        request: &R,
        now: UnixTimestamp,
    ) -> Result<VerifiedRequest, AuthError> {
        self.verify_at(
            secret,
            request.method(),
            request.host(),
            request.path(),
            &request.parameters(),
            now,
        )
    }

    /// Verify a request as of `now` (epoch seconds), reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if:
    /// - The `signature`, `key` or `timestamp` parameter is missing
    /// - The timestamp is not an integer or lies outside the skew window
    /// - The signature does not match
    pub fn verify_at(
        &self,
        secret: &str,
        method: &str,
        host: &str,
        path: &str,
        parameters: &ParameterSet,
        now: UnixTimestamp,
    ) -> Result<VerifiedRequest, AuthError> {
        let provided = parameters
            .get(SIGNATURE_PARAM)
            .ok_or(AuthError::MissingSignature)?;
        let api_key = parameters
            .get(KEY_PARAM)
            .ok_or_else(|| AuthError::MissingParameter(KEY_PARAM.to_owned()))?;
        let raw_timestamp = parameters
            .get(TIMESTAMP_PARAM)
            .ok_or_else(|| AuthError::MissingParameter(TIMESTAMP_PARAM.to_owned()))?;
        let timestamp: UnixTimestamp = raw_timestamp
            .parse()
            .map_err(|_| AuthError::InvalidTimestamp(raw_timestamp.to_owned()))?;

        if now.abs_diff(timestamp) > self.skew_window_secs {
            debug!(
                api_key,
                timestamp,
                now,
                skew_window_secs = self.skew_window_secs,
                "Request timestamp outside skew window"
            );
            return Err(AuthError::ExpiredRequest);
        }

        let mut unsigned = parameters.clone();
        unsigned.remove(SIGNATURE_PARAM);
        let base_string = build_base_string(method, host, path, &unsigned);
        let expected = compute_signature(secret, &base_string);

        if provided.as_bytes().ct_eq(expected.as_bytes()).into() {
            debug!(api_key, "Signature verification succeeded");
            Ok(VerifiedRequest {
                api_key: api_key.to_owned(),
                signature: provided.to_owned(),
                timestamp,
            })
        } else {
            debug!(api_key, method, host, path, "Signature mismatch");
            Err(AuthError::SignatureMismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::sign_at;
    use queryauth_core::Credentials;

    const T: UnixTimestamp = 1_700_000_000;
    const HOST: &str = "example.test";
    const PATH: &str = "/api/get-example";

    fn creds() -> Credentials {
        Credentials::new("k1", "s1")
    }

    fn user_params() -> ParameterSet {
        [
            ("name", "Ash"),
            ("email", "ash@s-mart.com"),
            ("department", "Housewares"),
        ]
        .into_iter()
        .collect()
    }

    fn signed_post() -> ParameterSet {
        sign_at(&creds(), "POST", HOST, PATH, &user_params(), T).unwrap()
    }

    #[test]
    fn test_should_validate_freshly_signed_request() {
        let v = Validator::default();
        assert!(v.validate_at("s1", "POST", HOST, PATH, &signed_post(), T));
    }

    #[test]
    fn test_should_validate_with_current_clock() {
        let signed = crate::signer::sign(&creds(), "GET", HOST, PATH, &user_params()).unwrap();
        assert!(Validator::default().validate("s1", "GET", HOST, PATH, &signed));
    }

    #[test]
    fn test_should_match_example_scenario() {
        let signed = sign_at(&creds(), "GET", HOST, PATH, &ParameterSet::new(), T).unwrap();
        assert_eq!(signed.len(), 3);
        assert_eq!(
            signed.get("signature"),
            Some("FL9Gm7//Ldk1GvdLVvxqYZs+Dyr/mTVsa3dq3I37qLw=")
        );

        let v = Validator::new(300);
        assert!(v.validate_at("s1", "GET", HOST, PATH, &signed, T));
        assert!(!v.validate_at("s1", "GET", HOST, PATH, &signed, T + 301));
    }

    #[test]
    fn test_should_accept_at_edge_of_skew_window() {
        let v = Validator::new(300);
        assert!(v.validate_at("s1", "POST", HOST, PATH, &signed_post(), T + 300));
        assert!(v.validate_at("s1", "POST", HOST, PATH, &signed_post(), T - 300));
    }

    #[test]
    fn test_should_reject_expired_request() {
        let v = Validator::new(300);
        let result = v.verify_at("s1", "POST", HOST, PATH, &signed_post(), T + 301);
        assert_eq!(result, Err(AuthError::ExpiredRequest));
    }

    #[test]
    fn test_should_reject_request_from_the_future() {
        let v = Validator::new(300);
        let result = v.verify_at("s1", "POST", HOST, PATH, &signed_post(), T - 301);
        assert_eq!(result, Err(AuthError::ExpiredRequest));
    }

    #[test]
    fn test_should_reject_tampered_parameter_value() {
        let mut params = signed_post();
        params.insert("department", "Sporting Goods");
        let result = Validator::default().verify_at("s1", "POST", HOST, PATH, &params, T);
        assert_eq!(result, Err(AuthError::SignatureMismatch));
    }

    #[test]
    fn test_should_reject_every_single_value_change() {
        let v = Validator::default();
        let signed = signed_post();
        for (name, _) in signed.iter() {
            if name == SIGNATURE_PARAM || name == TIMESTAMP_PARAM {
                continue;
            }
            let mut tampered = signed.clone();
            tampered.insert(name, "tampered");
            assert!(
                !v.validate_at("s1", "POST", HOST, PATH, &tampered, T),
                "tampering with {name} went unnoticed"
            );
        }
    }

    #[test]
    fn test_should_reject_added_parameter() {
        let mut params = signed_post();
        params.insert("admin", "true");
        assert!(!Validator::default().validate_at("s1", "POST", HOST, PATH, &params, T));
    }

    #[test]
    fn test_should_reject_removed_parameter() {
        let mut params = signed_post();
        params.remove("email");
        assert!(!Validator::default().validate_at("s1", "POST", HOST, PATH, &params, T));
    }

    #[test]
    fn test_should_reject_tampered_timestamp() {
        let mut params = signed_post();
        params.insert("timestamp", (T + 1).to_string());
        let result = Validator::default().verify_at("s1", "POST", HOST, PATH, &params, T);
        assert_eq!(result, Err(AuthError::SignatureMismatch));
    }

    #[test]
    fn test_should_reject_tampered_path_method_and_host() {
        let v = Validator::default();
        let signed = signed_post();
        assert!(!v.validate_at("s1", "POST", HOST, "/api/other", &signed, T));
        assert!(!v.validate_at("s1", "GET", HOST, PATH, &signed, T));
        assert!(!v.validate_at("s1", "POST", "evil.test", PATH, &signed, T));
    }

    #[test]
    fn test_should_ignore_method_and_host_case() {
        let v = Validator::default();
        assert!(v.validate_at("s1", "post", "EXAMPLE.test", PATH, &signed_post(), T));
    }

    #[test]
    fn test_should_reject_wrong_secret() {
        let result = Validator::default().verify_at("s2", "POST", HOST, PATH, &signed_post(), T);
        assert_eq!(result, Err(AuthError::SignatureMismatch));
    }

    #[test]
    fn test_should_report_missing_signature() {
        let mut params = signed_post();
        params.remove("signature");
        let result = Validator::default().verify_at("s1", "POST", HOST, PATH, &params, T);
        assert_eq!(result, Err(AuthError::MissingSignature));
    }

    #[test]
    fn test_should_report_missing_key_and_timestamp() {
        let v = Validator::default();

        let mut no_key = signed_post();
        no_key.remove("key");
        assert_eq!(
            v.verify_at("s1", "POST", HOST, PATH, &no_key, T),
            Err(AuthError::MissingParameter("key".to_owned()))
        );

        let mut no_ts = signed_post();
        no_ts.remove("timestamp");
        assert_eq!(
            v.verify_at("s1", "POST", HOST, PATH, &no_ts, T),
            Err(AuthError::MissingParameter("timestamp".to_owned()))
        );
    }

    #[test]
    fn test_should_report_non_integer_timestamp() {
        let mut params = signed_post();
        params.insert("timestamp", "yesterday");
        let result = Validator::default().verify_at("s1", "POST", HOST, PATH, &params, T);
        assert_eq!(
            result,
            Err(AuthError::InvalidTimestamp("yesterday".to_owned()))
        );
    }

    #[test]
    fn test_should_not_overflow_on_extreme_timestamp() {
        let mut params = signed_post();
        params.insert("timestamp", i64::MIN.to_string());
        let result = Validator::default().verify_at("s1", "POST", HOST, PATH, &params, i64::MAX);
        assert_eq!(result, Err(AuthError::ExpiredRequest));
    }

    #[test]
    fn test_should_return_verified_fields() {
        let signed = signed_post();
        let verified = Validator::default()
            .verify_at("s1", "POST", HOST, PATH, &signed, T)
            .unwrap();
        assert_eq!(verified.api_key, "k1");
        assert_eq!(verified.timestamp, T);
        assert_eq!(Some(verified.signature.as_str()), signed.get("signature"));
    }

    #[test]
    fn test_should_build_from_config() {
        let config = QueryAuthConfig::builder().skew_window_secs(15).build();
        assert_eq!(Validator::from_config(&config).skew_window_secs(), 15);
    }
}
