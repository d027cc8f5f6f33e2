//! Guard error types.

use queryauth_ledger::LedgerError;

/// Faults that abort a guarded request.
///
/// Rejections (bad signature, replay) are not errors; they are
/// [`GuardOutcome`](crate::GuardOutcome) values.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// The signature ledger failed for a reason other than a replay conflict.
    #[error("signature ledger unavailable: {0}")]
    Storage(String),
}

impl GuardError {
    /// Stable machine-readable code for responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Storage(_) => "storage_failure",
        }
    }
}

impl From<LedgerError> for GuardError {
    fn from(err: LedgerError) -> Self {
        Self::Storage(err.to_string())
    }
}
