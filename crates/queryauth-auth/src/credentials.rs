//! Credential provider trait and implementations.
//!
//! The provider side of the protocol only ever sees an API key on the wire.
//! [`CredentialProvider`] resolves that key to its shared secret.

use std::collections::HashMap;

use queryauth_core::Credentials;

use crate::error::AuthError;

/// Trait for looking up API secrets by API key.
///
/// Implementations may back this with a database, configuration file,
/// or any other credential store.
pub trait CredentialProvider: Send + Sync {
    /// Retrieve the secret for the given API key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AccessKeyNotFound`] if the key is not recognized.
    fn get_secret(&self, api_key: &str) -> Result<String, AuthError>;
}

/// A simple in-memory credential provider backed by a `HashMap`.
///
/// # Examples
///
/// ```
/// use queryauth_auth::credentials::{CredentialProvider, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::new(vec![("k1".to_owned(), "s1".to_owned())]);
/// assert_eq!(provider.get_secret("k1").unwrap(), "s1");
/// ```
#[derive(Clone)]
pub struct StaticCredentialProvider {
    credentials: HashMap<String, String>,
}

impl StaticCredentialProvider {
    /// Create a new provider from an iterable of `(api_key, secret)` pairs.
    pub fn new(credentials: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            credentials: credentials.into_iter().collect(),
        }
    }

    /// Create a provider serving a single credential pair.
    #[must_use]
    pub fn single(credentials: &Credentials) -> Self {
        Self::new([(credentials.key().to_owned(), credentials.secret().to_owned())])
    }
}

impl std::fmt::Debug for StaticCredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentialProvider")
            .field("keys", &self.credentials.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn get_secret(&self, api_key: &str) -> Result<String, AuthError> {
        self.credentials
            .get(api_key)
            .cloned()
            .ok_or_else(|| AuthError::AccessKeyNotFound(api_key.to_owned()))
    }
}
