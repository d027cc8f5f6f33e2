//! Signature validation with replay protection for QueryAuth.
//!
//! [`ReplayGuard`] runs the [`Validator`](queryauth_auth::Validator) and, if
//! the signature is good, records it in a
//! [`SignatureLedger`](queryauth_ledger::SignatureLedger). A conflicting
//! record means the request is a replay.
//!
//! ```text
//! Received -> Validating -> RejectedInvalidSignature -> Done
//!                        -> ValidatingReplay -> Accepted       -> Done
//!                                            -> RejectedReplay -> Done
//! ```

mod error;
mod guard;
mod outcome;

pub use error::GuardError;
pub use guard::ReplayGuard;
pub use outcome::{GuardOutcome, GuardState};
