//! The replay guard.
//!
//! The guard never holds a lock of its own. The only synchronization is the
//! ledger's atomic insert: when two copies of one signed request race, the
//! first save wins and the second sees a replay conflict.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use queryauth_auth::{
    AuthError, CredentialProvider, IncomingRequest, KEY_PARAM, Validator,
};
use queryauth_core::{ParameterSet, QueryAuthConfig, UnixTimestamp};
use queryauth_ledger::{LedgerEntry, LedgerError, SignatureLedger};
use tracing::{debug, error, warn};

use crate::error::GuardError;
use crate::outcome::{GuardOutcome, GuardState};

/// Validates signed requests and rejects replays.
#[derive(Clone)]
pub struct ReplayGuard {
    validator: Validator,
    ledger: Arc<dyn SignatureLedger>,
    credentials: Arc<dyn CredentialProvider>,
    purge_on_save: bool,
}

impl fmt::Debug for ReplayGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplayGuard")
            .field("validator", &self.validator)
            .field("ledger", &"...")
            .field("credentials", &"...")
            .field("purge_on_save", &self.purge_on_save)
            .finish()
    }
}

impl ReplayGuard {
    /// Create a guard from its collaborators.
    pub fn new(
        validator: Validator,
        ledger: Arc<dyn SignatureLedger>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            validator,
            ledger,
            credentials,
            purge_on_save: false,
        }
    }

    /// Create a guard using the skew window and purge policy from `config`.
    pub fn from_config(
        config: &QueryAuthConfig,
        ledger: Arc<dyn SignatureLedger>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self::new(Validator::from_config(config), ledger, credentials)
            .with_purge_on_save(config.purge_on_save)
    }

    /// Purge expired ledger entries before every save.
    #[must_use]
    pub fn with_purge_on_save(mut self, purge_on_save: bool) -> Self {
        self.purge_on_save = purge_on_save;
        self
    }

    /// The validator used for signature checks.
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Guard a request whose secret the caller has already resolved.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Storage`] if the ledger fails.
    pub async fn guard(
        &self,
        secret: &str,
        method: &str,
        host: &str,
        path: &str,
        parameters: &ParameterSet,
    ) -> Result<GuardOutcome, GuardError> {
        self.guard_at(
            secret,
            method,
            host,
            path,
            parameters,
            Utc::now().timestamp(),
        )
        .await
    }

    /// Guard a request as of `now` (epoch seconds).
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Storage`] if the ledger fails.
    pub async fn guard_at(
        &self,
        secret: &str,
        method: &str,
        host: &str,
        path: &str,
        parameters: &ParameterSet,
        now: UnixTimestamp,
    ) -> Result<GuardOutcome, GuardError> {
        debug!(state = %GuardState::Received, method, host, path);
        debug!(state = %GuardState::Validating, method, host, path);

        let verified = match self
            .validator
            .verify_at(secret, method, host, path, parameters, now)
        {
            Ok(verified) => verified,
            Err(reason) => return Ok(reject_invalid(reason, method, path)),
        };

        debug!(
            state = %GuardState::ValidatingReplay,
            api_key = %verified.api_key,
        );

        if self.purge_on_save {
            let removed = self.ledger.purge(now).await.map_err(|e| {
                error!(error = %e, "Lazy ledger purge failed");
                GuardError::from(e)
            })?;
            debug!(removed, "Lazy ledger purge");
        }

        let entry = LedgerEntry::new(
            verified.api_key.clone(),
            verified.signature.clone(),
            self.expires_at(now, verified.timestamp),
        );

        let outcome = match self.ledger.save(entry, now).await {
            Ok(()) => {
                debug!(state = %GuardState::Accepted, api_key = %verified.api_key);
                GuardOutcome::Accepted(verified)
            }
            Err(LedgerError::ReplayDetected { api_key }) => {
                warn!(
                    state = %GuardState::RejectedReplay,
                    %api_key,
                    method,
                    path,
                    "Replayed signature rejected"
                );
                GuardOutcome::RejectedReplay { api_key }
            }
            Err(e @ LedgerError::Storage(_)) => {
                error!(api_key = %verified.api_key, error = %e, "Signature ledger save failed");
                return Err(e.into());
            }
        };

        debug!(state = %GuardState::Done);
        Ok(outcome)
    }

    /// Guard an incoming request, resolving its secret from the `key` parameter.
    ///
    /// A missing or unknown key is an invalid signature.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Storage`] if the ledger fails.
    pub async fn guard_request<R>(&self, request: &R) -> Result<GuardOutcome, GuardError>
    where
        R: IncomingRequest + Sync + ?Sized,
    {
        self.guard_request_at(request, Utc::now().timestamp()).await
    }

    /// Guard an incoming request as of `now` (epoch seconds).
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Storage`] if the ledger fails.
    pub async fn guard_request_at<R>(
        &self,
        request: &R,
        now: UnixTimestamp,
    ) -> Result<GuardOutcome, GuardError>
    where
        R: IncomingRequest + Sync + ?Sized,
    {
        let parameters = request.parameters();

        let Some(api_key) = parameters.get(KEY_PARAM) else {
            return Ok(reject_invalid(
                AuthError::MissingParameter(KEY_PARAM.to_owned()),
                request.method(),
                request.path(),
            ));
        };

        let secret = match self.credentials.get_secret(api_key) {
            Ok(secret) => secret,
            Err(reason) => return Ok(reject_invalid(reason, request.method(), request.path())),
        };

        self.guard_at(
            &secret,
            request.method(),
            request.host(),
            request.path(),
            &parameters,
            now,
        )
        .await
    }

    /// Delete ledger entries that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Storage`] if the ledger fails.
    pub async fn purge_expired(&self, now: UnixTimestamp) -> Result<usize, GuardError> {
        Ok(self.ledger.purge(now).await?)
    }

    /// When an entry saved at `now` stops mattering.
    ///
    /// A signature stamped `timestamp` passes the skew check until
    /// `timestamp + window`, so a future-dated request is kept past
    /// `now + window`.
    fn expires_at(&self, now: UnixTimestamp, timestamp: UnixTimestamp) -> UnixTimestamp {
        let window = i64::try_from(self.validator.skew_window_secs()).unwrap_or(i64::MAX);
        now.max(timestamp).saturating_add(window)
    }
}

fn reject_invalid(reason: AuthError, method: &str, path: &str) -> GuardOutcome {
    warn!(
        state = %GuardState::RejectedInvalidSignature,
        reason = %reason,
        method,
        path,
        "Invalid signature rejected"
    );
    debug!(state = %GuardState::Done);
    GuardOutcome::RejectedInvalidSignature(reason)
}
