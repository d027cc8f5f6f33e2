//! Protected handler trait and dispatch.

use std::future::Future;
use std::pin::Pin;

use queryauth_auth::{IncomingRequest, KEY_PARAM, SIGNATURE_PARAM, TIMESTAMP_PARAM, VerifiedRequest};
use serde_json::{Value, json};

use crate::error::HandlerError;
use crate::request::HttpIncomingRequest;

/// A request that passed signature validation and replay protection.
#[derive(Debug, Clone)]
pub struct ProtectedRequest {
    /// What the validator established about the caller.
    pub verified: VerifiedRequest,
    /// The request itself.
    pub request: HttpIncomingRequest,
}

/// The operation a [`QueryAuthHttpService`](crate::QueryAuthHttpService)
/// protects.
///
/// The handler only ever sees accepted requests. Its `Ok` value becomes the
/// `data` of a JSend `success` envelope; its error becomes a JSend `error`.
pub trait ProtectedHandler: Send + Sync + 'static {
    /// Handle an accepted request.
    fn handle(
        &self,
        request: ProtectedRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value, HandlerError>> + Send>>;
}

/// Dispatch an accepted request to the handler.
pub async fn dispatch_request<H: ProtectedHandler>(
    handler: &H,
    request: ProtectedRequest,
) -> Result<Value, HandlerError> {
    tracing::debug!(
        api_key = %request.verified.api_key,
        method = %request.request.method(),
        path = %request.request.path(),
        "dispatching protected request"
    );
    handler.handle(request).await
}

/// Handler that echoes the caller's key and application parameters.
#[derive(Debug, Clone, Default)]
pub struct EchoHandler;

impl ProtectedHandler for EchoHandler {
    fn handle(
        &self,
        request: ProtectedRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Value, HandlerError>> + Send>> {
        Box::pin(async move {
            let mut parameters = request.request.parameters();
            for reserved in [KEY_PARAM, TIMESTAMP_PARAM, SIGNATURE_PARAM] {
                parameters.remove(reserved);
            }

            Ok(json!({
                "apiKey": request.verified.api_key,
                "method": request.request.method(),
                "path": request.request.path(),
                "parameters": parameters,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[tokio::test]
    async fn test_should_echo_application_parameters_only() {
        let (parts, ()) = http::Request::builder()
            .uri("/api/echo?q=klaatu&key=k1&timestamp=1&signature=abc")
            .header("host", "example.test")
            .body(())
            .unwrap()
            .into_parts();
        let request = ProtectedRequest {
            verified: VerifiedRequest {
                api_key: "k1".to_owned(),
                signature: "abc".to_owned(),
                timestamp: 1,
            },
            request: HttpIncomingRequest::from_parts(&parts, Bytes::new()),
        };

        let data = dispatch_request(&EchoHandler, request).await.unwrap();
        assert_eq!(
            data,
            json!({
                "apiKey": "k1",
                "method": "GET",
                "path": "/api/echo",
                "parameters": {"q": "klaatu"},
            })
        );
    }
}
