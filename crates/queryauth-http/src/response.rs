//! Response construction.

use queryauth_auth::VerifiedRequest;
use queryauth_guard::GuardOutcome;
use serde_json::Value;

use crate::body::QueryAuthResponseBody;
use crate::envelope::JSendEnvelope;
use crate::error::HttpError;

/// Content type of every QueryAuth response.
pub const CONTENT_TYPE: &str = "application/json";

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Render an envelope with the given status.
#[must_use]
pub fn envelope_response(
    status: http::StatusCode,
    envelope: &JSendEnvelope,
    request_id: &str,
) -> http::Response<QueryAuthResponseBody> {
    http::Response::builder()
        .status(status)
        .header("content-type", CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(QueryAuthResponseBody::from_bytes(envelope.to_json()))
        .expect("valid JSend response")
}

/// A `200 OK` success envelope around handler output.
#[must_use]
pub fn success_response(data: Value, request_id: &str) -> http::Response<QueryAuthResponseBody> {
    envelope_response(
        http::StatusCode::OK,
        &JSendEnvelope::success(data),
        request_id,
    )
}

/// A `403 Forbidden` fail envelope carrying `message`.
#[must_use]
pub fn fail_response(message: &str, request_id: &str) -> http::Response<QueryAuthResponseBody> {
    envelope_response(
        http::StatusCode::FORBIDDEN,
        &JSendEnvelope::fail(message),
        request_id,
    )
}

/// Take the verified request out of an accepted outcome, or render the fail
/// response for a rejected one.
///
/// # Errors
///
/// Returns the `403` fail response when the guard rejected the request.
#[allow(clippy::result_large_err)]
pub fn accept_or_reject(
    outcome: GuardOutcome,
    request_id: &str,
) -> Result<VerifiedRequest, http::Response<QueryAuthResponseBody>> {
    match outcome {
        GuardOutcome::Accepted(verified) => Ok(verified),
        rejected => Err(fail_response(
            rejected.rejection_message().unwrap_or_default(),
            request_id,
        )),
    }
}

/// An error envelope with the error's status and code.
#[must_use]
pub fn error_to_response(
    error: &HttpError,
    request_id: &str,
) -> http::Response<QueryAuthResponseBody> {
    envelope_response(
        error.status_code(),
        &JSendEnvelope::error(error.to_string(), error.code()),
        request_id,
    )
}
