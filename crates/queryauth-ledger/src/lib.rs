//! Replay-detection ledger of accepted signatures for QueryAuth.
//!
//! Once a signed request has been accepted, its `(api_key, signature)` pair is
//! recorded until the signature could no longer pass validation anyway. A
//! second save of the same pair is a replay.
//!
//! # Architecture
//!
//! ```text
//! SignatureLedger (async trait)
//!   └── InMemoryLedger: DashMap<(api_key, signature), expires_at>
//! ```
//!
//! Replay detection relies on the backend's atomic insert-if-absent, never on
//! an `exists` check followed by a write.

pub mod error;
pub mod ledger;
pub mod memory;

pub use error::{LedgerError, LedgerResult};
pub use ledger::{LedgerEntry, SignatureLedger, is_expired};
pub use memory::InMemoryLedger;
