//! JSend response envelope.
//!
//! Every response body is one of three shapes:
//!
//! ```json
//! {"status":"success","data":{"apiKey":"k1","path":"/api/get-example"}}
//! {"status":"fail","data":{"message":"Invalid signature"}}
//! {"status":"error","message":"signature ledger unavailable","code":"storage_failure"}
//! ```
//!
//! `fail` means the caller did something wrong; `error` means the server did.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A JSend envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JSendEnvelope {
    /// The request was accepted and handled.
    Success {
        /// Handler output.
        data: Value,
    },
    /// The request was rejected.
    Fail {
        /// Rejection details, always carrying a `message`.
        data: Value,
    },
    /// Processing failed on the server.
    Error {
        /// Human-readable description.
        message: String,
        /// Machine-readable error code.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        /// Optional extra detail.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
}

impl JSendEnvelope {
    /// A `success` envelope around `data`.
    #[must_use]
    pub fn success(data: Value) -> Self {
        Self::Success { data }
    }

    /// A `fail` envelope with `{"message": message}` as its data.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail {
            data: json!({ "message": message.into() }),
        }
    }

    /// An `error` envelope with a message and code.
    #[must_use]
    pub fn error(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            code: Some(code.into()),
            data: None,
        }
    }

    /// The `status` field value.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Fail { .. } => "fail",
            Self::Error { .. } => "error",
        }
    }

    /// Serialize to JSON bytes.
    #[must_use]
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("JSON serialization of envelope cannot fail")
    }
}
