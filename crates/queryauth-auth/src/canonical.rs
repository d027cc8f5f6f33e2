//! Signing base string construction.
//!
//! Signer and validator both build the string that goes into the MAC with
//! [`build_base_string`]:
//!
//! ```text
//! UPPERCASE(method)\n
//! lowercase(host)\n
//! CanonicalPath\n
//! CanonicalParameters
//! ```
//!
//! Parameter names and values are percent-encoded per RFC 3986: everything
//! except the unreserved characters (`A-Z`, `a-z`, `0-9`, `-`, `_`, `.`, `~`)
//! becomes `%XX` with uppercase hex. A space is always `%20` and a plus sign
//! is always `%2B`, never the form-encoding `+`.

use percent_encoding::{
    AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode, utf8_percent_encode,
};
use queryauth_core::ParameterSet;

/// The set of characters that must be percent-encoded.
const RFC3986_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the signing base string from its components.
///
/// The `signature` parameter is never part of the base string; callers pass
/// the parameter set without it.
///
/// # Examples
///
/// ```
/// use queryauth_auth::canonical::build_base_string;
/// use queryauth_core::ParameterSet;
///
/// let params: ParameterSet = [("timestamp", "1700000000"), ("key", "k1")].into_iter().collect();
/// let base = build_base_string("get", "Example.TEST", "/api/get-example", &params);
/// assert_eq!(base, "GET\nexample.test\n/api/get-example\nkey=k1&timestamp=1700000000");
/// ```
#[must_use]
pub fn build_base_string(method: &str, host: &str, path: &str, parameters: &ParameterSet) -> String {
    let method = method.to_ascii_uppercase();
    let host = host.to_ascii_lowercase();
    let canonical_path = build_canonical_path(path);
    let canonical_params = build_canonical_parameters(parameters);

    format!("{method}\n{host}\n{canonical_path}\n{canonical_params}")
}

/// Build the canonical path by encoding each segment individually.
///
/// Forward slashes are preserved and an empty path becomes `/`. Segments are
/// decoded to raw bytes before being re-encoded so that `/a b` and `/a%20b`
/// agree. Bytes that are not valid UTF-8 are kept as they are.
///
/// # Examples
///
/// ```
/// use queryauth_auth::canonical::build_canonical_path;
///
/// assert_eq!(build_canonical_path(""), "/");
/// assert_eq!(build_canonical_path("/hello world"), "/hello%20world");
/// assert_eq!(build_canonical_path("/hello%20world"), "/hello%20world");
/// ```
#[must_use]
pub fn build_canonical_path(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }

    path.split('/')
        .map(|segment| {
            let decoded: Vec<u8> = percent_decode_str(segment).collect();
            percent_encode(&decoded, RFC3986_ENCODE_SET).to_string()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the canonical parameter string: names sorted byte-wise, each pair
/// encoded as `name=value` and joined with `&`.
///
/// Values are the decoded parameter values; this function does the encoding.
///
/// # Examples
///
/// ```
/// use queryauth_auth::canonical::build_canonical_parameters;
/// use queryauth_core::ParameterSet;
///
/// let params: ParameterSet = [("b", "x y"), ("a", "1+1")].into_iter().collect();
/// assert_eq!(build_canonical_parameters(&params), "a=1%2B1&b=x%20y");
/// ```
#[must_use]
pub fn build_canonical_parameters(parameters: &ParameterSet) -> String {
    parameters
        .sorted()
        .into_iter()
        .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode a string with the RFC 3986 unreserved set.
#[must_use]
pub fn encode(input: &str) -> String {
    utf8_percent_encode(input, RFC3986_ENCODE_SET).to_string()
}
