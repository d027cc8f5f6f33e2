//! HTTP service layer for QueryAuth.
//!
//! This crate connects the signing protocol to `http`/hyper types:
//!
//! - **Request adapters**: [`HttpIncomingRequest`] for validation and
//!   [`HttpOutgoingRequest`] so clients can sign an `http::Request<String>`
//!   in place
//! - **Envelope**: JSend `success` / `fail` / `error` response bodies
//! - **Handler trait**: the boundary between transport and the protected
//!   operation
//! - **Service**: hyper `Service` that guards every request before dispatch

pub mod body;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod request;
pub mod response;
pub mod service;

pub use body::QueryAuthResponseBody;
pub use envelope::JSendEnvelope;
pub use error::{HandlerError, HttpError};
pub use handler::{EchoHandler, ProtectedHandler, ProtectedRequest};
pub use request::{HttpIncomingRequest, HttpOutgoingRequest};
pub use service::QueryAuthHttpService;
