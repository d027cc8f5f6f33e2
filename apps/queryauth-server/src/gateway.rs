//! Gateway service that answers health probes and guards everything else.
//!
//! `GET /health` (and `/_health`) is served without a signature. Every other
//! request goes through the [`QueryAuthHttpService`].

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use hyper::body::Incoming;
use hyper::service::Service;
use queryauth_http::response::success_response;
use queryauth_http::{ProtectedHandler, QueryAuthHttpService, QueryAuthResponseBody};
use serde_json::json;

/// Version reported by the health endpoint.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Front service for the QueryAuth demo server.
#[derive(Debug)]
pub struct GatewayService<H: ProtectedHandler> {
    protected: QueryAuthHttpService<H>,
}

impl<H: ProtectedHandler> GatewayService<H> {
    /// Create a new gateway in front of a protected service.
    pub fn new(protected: QueryAuthHttpService<H>) -> Self {
        Self { protected }
    }
}

impl<H: ProtectedHandler> Clone for GatewayService<H> {
    fn clone(&self) -> Self {
        Self {
            protected: self.protected.clone(),
        }
    }
}

impl<H: ProtectedHandler> Service<http::Request<Incoming>> for GatewayService<H> {
    type Response = http::Response<QueryAuthResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        if is_health_check(req.method(), req.uri().path()) {
            let request_id = uuid::Uuid::new_v4().to_string();
            return Box::pin(async move { Ok(health_check_response(&request_id)) });
        }

        let protected = self.protected.clone();
        Box::pin(async move { protected.call(req).await })
    }
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/health" || path == "/_health")
}

/// Health check response in the same JSend envelope as everything else.
fn health_check_response(request_id: &str) -> http::Response<QueryAuthResponseBody> {
    success_response(
        json!({
            "service": "queryauth",
            "status": "running",
            "version": VERSION,
        }),
        request_id,
    )
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    #[test]
    fn test_should_detect_health_check_paths() {
        assert!(is_health_check(&http::Method::GET, "/health"));
        assert!(is_health_check(&http::Method::GET, "/_health"));
        assert!(!is_health_check(&http::Method::POST, "/health"));
        assert!(!is_health_check(&http::Method::GET, "/api/phrase"));
    }

    #[test]
    fn test_should_report_running_in_health_response() {
        let resp = health_check_response("req-1");
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(resp.headers().get("x-request-id").unwrap(), "req-1");

        let bytes = tokio_test::block_on(resp.into_body().collect())
            .unwrap()
            .to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["status"], "running");
    }
}
