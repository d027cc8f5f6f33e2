//! Signature ledger trait definition.
//!
//! [`SignatureLedger`] is the storage adapter behind replay protection. Any
//! backend works (embedded map, relational table with a unique index,
//! distributed store with conditional put) as long as [`save`] is an atomic
//! insert-if-absent.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`save`] | Record an accepted signature; conflict means replay |
//! | [`exists`](SignatureLedger::exists) | Read-only check, for diagnostics |
//! | [`purge`](SignatureLedger::purge) | Delete entries that expired before `now` |
//! | [`len`](SignatureLedger::len) | Number of stored entries |
//!
//! [`save`]: SignatureLedger::save

use async_trait::async_trait;
use queryauth_core::UnixTimestamp;

use crate::error::LedgerResult;

/// An accepted signature and the time after which it can be forgotten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// The API key that signed the request.
    pub api_key: String,
    /// The accepted signature.
    pub signature: String,
    /// Epoch seconds after which the entry no longer blocks a save.
    pub expires_at: UnixTimestamp,
}

impl LedgerEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        signature: impl Into<String>,
        expires_at: UnixTimestamp,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            signature: signature.into(),
            expires_at,
        }
    }
}

/// Whether an entry expiring at `expires_at` is expired as of `now`.
///
/// The expiry instant itself is still live.
#[must_use]
pub fn is_expired(expires_at: UnixTimestamp, now: UnixTimestamp) -> bool {
    expires_at < now
}

/// Persistent record of accepted signatures.
///
/// Implementations must be safe to call concurrently. Every method is a
/// suspension point so backends may perform I/O. Methods that care about
/// expiry take the caller's `now` so the ledger and the guard share one clock.
#[async_trait]
pub trait SignatureLedger: Send + Sync {
    /// Record an accepted signature as of `now`.
    ///
    /// An existing entry that is already expired at `now` is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ReplayDetected`](crate::LedgerError::ReplayDetected)
    /// if an unexpired entry with the same `(api_key, signature)` already
    /// exists, or [`LedgerError::Storage`](crate::LedgerError::Storage) if the
    /// backend fails.
    async fn save(&self, entry: LedgerEntry, now: UnixTimestamp) -> LedgerResult<()>;

    /// Whether an entry for the pair exists and is unexpired at `now`.
    async fn exists(
        &self,
        api_key: &str,
        signature: &str,
        now: UnixTimestamp,
    ) -> LedgerResult<bool>;

    /// Delete every entry with `expires_at < now`, returning how many were removed.
    async fn purge(&self, now: UnixTimestamp) -> LedgerResult<usize>;

    /// Number of stored entries, expired or not.
    async fn len(&self) -> LedgerResult<usize>;

    /// Whether the ledger holds no entries.
    async fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len().await? == 0)
    }
}
