//! Guard outcomes and per-request states.

use std::fmt;

use queryauth_auth::{AuthError, VerifiedRequest};

/// States a request passes through inside the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The request has arrived.
    Received,
    /// The signature is being checked.
    Validating,
    /// The signature, key or timestamp was not acceptable.
    RejectedInvalidSignature,
    /// The signature is valid and is being recorded in the ledger.
    ValidatingReplay,
    /// First use of a valid signature.
    Accepted,
    /// The signature was already recorded.
    RejectedReplay,
    /// Processing finished.
    Done,
}

impl fmt::Display for GuardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "RECEIVED",
            Self::Validating => "VALIDATING",
            Self::RejectedInvalidSignature => "REJECTED_INVALID_SIGNATURE",
            Self::ValidatingReplay => "VALIDATING_REPLAY",
            Self::Accepted => "ACCEPTED",
            Self::RejectedReplay => "REJECTED_REPLAY",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// The terminal result of guarding one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The request is authentic and seen for the first time.
    Accepted(VerifiedRequest),
    /// The request failed validation. The reason is for logs only.
    RejectedInvalidSignature(AuthError),
    /// The request carries a signature that was already accepted.
    RejectedReplay {
        /// The API key whose signature was replayed.
        api_key: String,
    },
}

impl GuardOutcome {
    /// The state the request ended in before [`GuardState::Done`].
    #[must_use]
    pub fn state(&self) -> GuardState {
        match self {
            Self::Accepted(_) => GuardState::Accepted,
            Self::RejectedInvalidSignature(_) => GuardState::RejectedInvalidSignature,
            Self::RejectedReplay { .. } => GuardState::RejectedReplay,
        }
    }

    /// Whether the protected operation may proceed.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// The consumer-facing rejection message, or `None` when accepted.
    ///
    /// Every validation failure maps to the same message so callers cannot
    /// probe which check failed.
    #[must_use]
    pub fn rejection_message(&self) -> Option<&'static str> {
        match self {
            Self::Accepted(_) => None,
            Self::RejectedInvalidSignature(_) => Some("Invalid signature"),
            Self::RejectedReplay { .. } => Some("Signature has already been used"),
        }
    }
}
