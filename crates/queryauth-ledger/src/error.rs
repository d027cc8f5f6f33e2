//! Ledger error types.

/// Errors returned by [`SignatureLedger`](crate::SignatureLedger) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The `(api_key, signature)` pair is already recorded and not expired.
    #[error("signature already used by {api_key}")]
    ReplayDetected {
        /// The API key whose signature was replayed.
        api_key: String,
    },

    /// The storage backend failed.
    #[error("ledger storage failure: {0}")]
    Storage(String),
}

/// Convenience result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
