//! Core types, configuration, and errors for QueryAuth.
//!
//! This crate provides the building blocks shared by the signing, ledger,
//! guard and HTTP crates: API [`Credentials`], the [`ParameterSet`] carried in
//! a request's query string or form body, the service-wide
//! [`QueryAuthConfig`], and the [`QueryAuthError`] type.

mod config;
mod error;
mod types;

pub use config::QueryAuthConfig;
pub use error::{QueryAuthError, QueryAuthResult};
pub use types::{Credentials, ParameterSet, UnixTimestamp};
