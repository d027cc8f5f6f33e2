//! In-memory signature ledger.
//!
//! Entries live in a [`DashMap`] keyed by `(api_key, signature)`. The shard
//! write lock taken by [`DashMap::entry`] makes check-and-insert atomic, so
//! two concurrent saves of the same pair cannot both succeed.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use queryauth_core::UnixTimestamp;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{LedgerEntry, SignatureLedger, is_expired};

/// In-memory [`SignatureLedger`].
///
/// Cloning is cheap and clones share the same table.
///
/// # Examples
///
/// ```
/// use queryauth_ledger::{InMemoryLedger, LedgerEntry, LedgerError, SignatureLedger};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let ledger = InMemoryLedger::new();
/// let now = 1_700_000_000;
///
/// ledger.save(LedgerEntry::new("k1", "sig", now + 300), now).await.unwrap();
/// let replay = ledger.save(LedgerEntry::new("k1", "sig", now + 300), now).await;
/// assert!(matches!(replay, Err(LedgerError::ReplayDetected { .. })));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    entries: Arc<DashMap<(String, String), UnixTimestamp>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignatureLedger for InMemoryLedger {
    async fn save(&self, entry: LedgerEntry, now: UnixTimestamp) -> LedgerResult<()> {
        let LedgerEntry {
            api_key,
            signature,
            expires_at,
        } = entry;

        match self.entries.entry((api_key, signature)) {
            Entry::Vacant(vacant) => {
                vacant.insert(expires_at);
                Ok(())
            }
            // An entry that outlived its expiry but was not purged yet.
            Entry::Occupied(mut occupied) if is_expired(*occupied.get(), now) => {
                occupied.insert(expires_at);
                Ok(())
            }
            Entry::Occupied(occupied) => {
                let api_key = occupied.key().0.clone();
                debug!(%api_key, "Signature already recorded");
                Err(LedgerError::ReplayDetected { api_key })
            }
        }
    }

    async fn exists(
        &self,
        api_key: &str,
        signature: &str,
        now: UnixTimestamp,
    ) -> LedgerResult<bool> {
        Ok(self
            .entries
            .get(&(api_key.to_owned(), signature.to_owned()))
            .is_some_and(|expires_at| !is_expired(*expires_at, now)))
    }

    async fn purge(&self, now: UnixTimestamp) -> LedgerResult<usize> {
        let mut removed = 0;
        self.entries.retain(|_, expires_at| {
            let keep = !is_expired(*expires_at, now);
            if !keep {
                removed += 1;
            }
            keep
        });
        debug!(removed, now, "Purged expired signatures");
        Ok(removed)
    }

    async fn len(&self) -> LedgerResult<usize> {
        Ok(self.entries.len())
    }
}
