//! QueryAuth HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use queryauth_guard::ReplayGuard;
use tracing::{info, warn};

use crate::body::QueryAuthResponseBody;
use crate::error::HttpError;
use crate::handler::{ProtectedHandler, ProtectedRequest, dispatch_request};
use crate::request::HttpIncomingRequest;
use crate::response::{
    CONTENT_TYPE, REQUEST_ID_HEADER, accept_or_reject, error_to_response, success_response,
};

/// Hyper `Service` that guards every request before handing it to a
/// [`ProtectedHandler`].
///
/// Invalid and replayed requests never reach the handler.
#[derive(Debug)]
pub struct QueryAuthHttpService<H: ProtectedHandler> {
    handler: Arc<H>,
    guard: Arc<ReplayGuard>,
}

impl<H: ProtectedHandler> QueryAuthHttpService<H> {
    /// Create a new `QueryAuthHttpService`.
    pub fn new(handler: Arc<H>, guard: ReplayGuard) -> Self {
        Self {
            handler,
            guard: Arc::new(guard),
        }
    }

    /// The guard protecting this service.
    #[must_use]
    pub fn guard(&self) -> &ReplayGuard {
        &self.guard
    }

    /// Run an already collected request through the guard and handler.
    pub async fn process(
        &self,
        parts: http::request::Parts,
        body: Bytes,
        request_id: &str,
    ) -> http::Response<QueryAuthResponseBody> {
        let response =
            process_request(&parts, body, self.handler.as_ref(), &self.guard, request_id).await;
        add_common_headers(response, request_id)
    }
}

impl<H: ProtectedHandler> Clone for QueryAuthHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            guard: Arc::clone(&self.guard),
        }
    }
}

impl<H: ProtectedHandler> hyper::service::Service<http::Request<Incoming>>
    for QueryAuthHttpService<H>
{
    type Response = http::Response<QueryAuthResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            let (parts, incoming) = req.into_parts();
            let response = match collect_body(incoming).await {
                Ok(body) => service.process(parts, body, &request_id).await,
                Err(err) => add_common_headers(error_to_response(&err, &request_id), &request_id),
            };
            Ok(response)
        })
    }
}

/// Guard, dispatch and render a single request.
async fn process_request<H: ProtectedHandler>(
    parts: &http::request::Parts,
    body: Bytes,
    handler: &H,
    guard: &ReplayGuard,
    request_id: &str,
) -> http::Response<QueryAuthResponseBody> {
    let request = HttpIncomingRequest::from_parts(parts, body);

    let outcome = match guard.guard_request(&request).await {
        Ok(outcome) => outcome,
        Err(err) => return error_to_response(&HttpError::from(err), request_id),
    };

    let verified = match accept_or_reject(outcome, request_id) {
        Ok(verified) => verified,
        Err(rejection) => return rejection,
    };

    info!(
        request_id,
        api_key = %verified.api_key,
        method = %parts.method,
        path = parts.uri.path(),
        "Accepted signed request"
    );

    match dispatch_request(handler, ProtectedRequest { verified, request }).await {
        Ok(data) => success_response(data, request_id),
        Err(err) => {
            warn!(request_id, error = %err, "Protected handler failed");
            error_to_response(&HttpError::from(err), request_id)
        }
    }
}

/// Collect the incoming body into a single `Bytes` buffer.
async fn collect_body(incoming: Incoming) -> Result<Bytes, HttpError> {
    incoming
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| HttpError::BadRequest(e.to_string()))
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: http::Response<QueryAuthResponseBody>,
    request_id: &str,
) -> http::Response<QueryAuthResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry(REQUEST_ID_HEADER).or_insert(hv);
    }

    headers
        .entry("content-type")
        .or_insert(http::HeaderValue::from_static(CONTENT_TYPE));

    headers.insert("server", http::HeaderValue::from_static("QueryAuth"));

    response
}
