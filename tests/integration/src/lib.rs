//! Integration tests for the QueryAuth server.
//!
//! These tests require a running `queryauth-server` at `localhost:8080`
//! started with `API_KEY=k1 API_SECRET=s1` (or the values of the same
//! variables in the test environment). They are marked `#[ignore]` so they
//! don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p queryauth-integration -- --ignored
//! ```

use std::sync::Once;

use anyhow::{Context, Result};
use queryauth_auth::{sign_at, sign_request};
use queryauth_core::{Credentials, ParameterSet, UnixTimestamp};
use queryauth_http::HttpOutgoingRequest;
use queryauth_http::request::{FORM_CONTENT_TYPE, encode_form};
use serde_json::Value;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("QUERYAUTH_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned())
}

/// Credentials the server under test was started with.
#[must_use]
pub fn credentials() -> Credentials {
    let key = std::env::var("API_KEY").unwrap_or_else(|_| "k1".to_owned());
    let secret = std::env::var("API_SECRET").unwrap_or_else(|_| "s1".to_owned());
    Credentials::new(key, secret)
}

/// Create an HTTP client for the server.
#[must_use]
pub fn client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

/// Parameters with a unique nonce so concurrent test runs never collide.
#[must_use]
pub fn unique_params(pairs: &[(&str, &str)]) -> ParameterSet {
    let mut params: ParameterSet = pairs.iter().copied().collect();
    params.insert("nonce", uuid::Uuid::new_v4().to_string());
    params
}

/// Sign a request in place and send it.
pub async fn send_signed(
    client: &reqwest::Client,
    credentials: &Credentials,
    request: http::Request<String>,
) -> Result<(reqwest::StatusCode, Value)> {
    let mut outgoing = HttpOutgoingRequest::new(request);
    sign_request(credentials, &mut outgoing).context("failed to sign request")?;
    send(client, outgoing.into_inner()).await
}

/// Build a `GET` request for `path` carrying `params` in its query string.
pub fn get_request(path: &str, params: &ParameterSet) -> Result<http::Request<String>> {
    let query = encode_form(params);
    http::Request::builder()
        .method("GET")
        .uri(format!("{}{path}?{query}", endpoint_url()))
        .body(String::new())
        .context("invalid GET request")
}

/// Build a `POST` request for `path` carrying `params` in a form body.
pub fn post_request(path: &str, params: &ParameterSet) -> Result<http::Request<String>> {
    http::Request::builder()
        .method("POST")
        .uri(format!("{}{path}", endpoint_url()))
        .header("content-type", FORM_CONTENT_TYPE)
        .body(encode_form(params))
        .context("invalid POST request")
}

/// Build a `GET` request signed as of `now`, for replaying or aging tests.
pub fn signed_get_at(
    credentials: &Credentials,
    path: &str,
    params: &ParameterSet,
    now: UnixTimestamp,
) -> Result<http::Request<String>> {
    let url = reqwest::Url::parse(&endpoint_url()).context("invalid endpoint URL")?;
    let host = url.host_str().unwrap_or("localhost");
    let signed = sign_at(credentials, "GET", host, path, params, now)?;
    get_request(path, &signed)
}

/// Send a prepared request and decode the JSend body.
pub async fn send(
    client: &reqwest::Client,
    request: http::Request<String>,
) -> Result<(reqwest::StatusCode, Value)> {
    let request = reqwest::Request::try_from(request).context("cannot convert request")?;
    let response = client
        .execute(request)
        .await
        .context("request to server failed")?;
    let status = response.status();
    let body = response
        .json::<Value>()
        .await
        .context("response body is not JSON")?;
    Ok((status, body))
}

mod test_health;
mod test_rejection;
mod test_replay;
mod test_signing;
