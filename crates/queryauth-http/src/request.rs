//! `http` request adapters.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST};
use http::uri::PathAndQuery;
use queryauth_auth::request::uses_body_parameters;
use queryauth_auth::{AuthError, IncomingRequest, OutgoingRequest};
use queryauth_core::ParameterSet;

/// Content type of signed `POST` bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A received request reduced to what the validator reads.
///
/// Built from request parts plus the collected body so it can outlive the
/// hyper connection and be handed to the protected handler.
#[derive(Debug, Clone)]
pub struct HttpIncomingRequest {
    method: String,
    host: String,
    path: String,
    query: String,
    body: Bytes,
    form_body: bool,
}

impl HttpIncomingRequest {
    /// Build from request parts and the collected body.
    ///
    /// The host comes from the `Host` header, falling back to the URI
    /// authority, with any port removed.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts, body: Bytes) -> Self {
        let host = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| parts.uri.authority().map(http::uri::Authority::as_str))
            .map(strip_port)
            .unwrap_or_default()
            .to_owned();

        let form_body = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(is_form_content_type);

        Self {
            method: parts.method.as_str().to_owned(),
            host,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().unwrap_or_default().to_owned(),
            body,
            form_body,
        }
    }

    /// The raw query string, without the leading `?`.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The raw request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl IncomingRequest for HttpIncomingRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn query_parameters(&self) -> ParameterSet {
        decode_form(self.query.as_bytes())
    }

    fn body_parameters(&self) -> ParameterSet {
        if self.form_body {
            decode_form(&self.body)
        } else {
            ParameterSet::new()
        }
    }
}

/// An outgoing `http::Request<String>` the signer can rewrite.
///
/// `POST` parameters are read from and written to the form body (setting the
/// content type); every other method rewrites the URI query string.
#[derive(Debug)]
pub struct HttpOutgoingRequest {
    inner: http::Request<String>,
}

impl HttpOutgoingRequest {
    /// Wrap a request for signing.
    #[must_use]
    pub fn new(inner: http::Request<String>) -> Self {
        Self { inner }
    }

    /// The wrapped request.
    #[must_use]
    pub fn get_ref(&self) -> &http::Request<String> {
        &self.inner
    }

    /// Unwrap the (signed) request.
    #[must_use]
    pub fn into_inner(self) -> http::Request<String> {
        self.inner
    }
}

impl From<http::Request<String>> for HttpOutgoingRequest {
    fn from(inner: http::Request<String>) -> Self {
        Self::new(inner)
    }
}

impl OutgoingRequest for HttpOutgoingRequest {
    fn method(&self) -> &str {
        self.inner.method().as_str()
    }

    fn host(&self) -> &str {
        self.inner
            .uri()
            .host()
            .or_else(|| {
                self.inner
                    .headers()
                    .get(HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(strip_port)
            })
            .unwrap_or_default()
    }

    fn path(&self) -> &str {
        self.inner.uri().path()
    }

    fn parameters(&self) -> ParameterSet {
        if uses_body_parameters(self.inner.method().as_str()) {
            decode_form(self.inner.body().as_bytes())
        } else {
            decode_form(self.inner.uri().query().unwrap_or_default().as_bytes())
        }
    }

    fn set_parameters(&mut self, parameters: ParameterSet) -> Result<(), AuthError> {
        let encoded = encode_form(&parameters);

        if uses_body_parameters(self.inner.method().as_str()) {
            *self.inner.body_mut() = encoded;
            self.inner.headers_mut().insert(
                CONTENT_TYPE,
                http::HeaderValue::from_static(FORM_CONTENT_TYPE),
            );
            return Ok(());
        }

        let path = self.inner.uri().path();
        let path_and_query = if encoded.is_empty() {
            path.to_owned()
        } else {
            format!("{path}?{encoded}")
        };

        let mut parts = self.inner.uri().clone().into_parts();
        let path_and_query = PathAndQuery::try_from(path_and_query)
            .map_err(|e| AuthError::RequestRewrite(e.to_string()))?;
        parts.path_and_query = Some(path_and_query);
        let uri =
            http::Uri::from_parts(parts).map_err(|e| AuthError::RequestRewrite(e.to_string()))?;
        *self.inner.uri_mut() = uri;
        Ok(())
    }
}

/// Decode `application/x-www-form-urlencoded` input. A repeated name keeps
/// its last value.
#[must_use]
pub fn decode_form(input: &[u8]) -> ParameterSet {
    form_urlencoded::parse(input).collect()
}

/// Encode parameters as `application/x-www-form-urlencoded`, sorted by name.
#[must_use]
pub fn encode_form(parameters: &ParameterSet) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(parameters.sorted())
        .finish()
}

fn is_form_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Remove a trailing `:port` from a host, keeping bracketed IPv6 literals.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    host.split(':').next().unwrap_or(host)
}
