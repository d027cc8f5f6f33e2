//! Configuration management for QueryAuth services.
//!
//! All configuration is driven by environment variables.

use serde::{Deserialize, Serialize};
use tracing::warn;
use typed_builder::TypedBuilder;

use crate::error::{QueryAuthError, QueryAuthResult};
use crate::types::Credentials;

/// Global configuration for QueryAuth.
///
/// # Examples
///
/// ```
/// use queryauth_core::QueryAuthConfig;
///
/// let config = QueryAuthConfig::builder().skew_window_secs(60).build();
/// assert_eq!(config.skew_window_secs, 60);
/// assert_eq!(config.listen, "0.0.0.0:8080");
/// ```
#[derive(Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct QueryAuthConfig {
    /// Bind address for the HTTP server.
    #[builder(default = String::from("0.0.0.0:8080"))]
    pub listen: String,

    /// Maximum allowed difference, in seconds, between a request timestamp
    /// and the verification time. Also the ledger retention period.
    #[builder(default = 300)]
    pub skew_window_secs: u64,

    /// Period of the background ledger purge, in seconds.
    #[builder(default = 60)]
    pub purge_interval_secs: u64,

    /// Whether to purge expired ledger entries before every save.
    #[builder(default = false)]
    pub purge_on_save: bool,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// API key served by the static credential provider.
    #[builder(default, setter(strip_option))]
    pub api_key: Option<String>,

    /// Secret for [`api_key`](Self::api_key).
    #[serde(skip_serializing)]
    #[builder(default, setter(strip_option))]
    pub api_secret: Option<String>,
}

impl std::fmt::Debug for QueryAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryAuthConfig")
            .field("listen", &self.listen)
            .field("skew_window_secs", &self.skew_window_secs)
            .field("purge_interval_secs", &self.purge_interval_secs)
            .field("purge_on_save", &self.purge_on_save)
            .field("log_level", &self.log_level)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "..."))
            .finish()
    }
}

impl Default for QueryAuthConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_owned(),
            skew_window_secs: 300,
            purge_interval_secs: 60,
            purge_on_save: false,
            log_level: "info".to_owned(),
            api_key: None,
            api_secret: None,
        }
    }
}

impl QueryAuthConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `QUERYAUTH_LISTEN` | `0.0.0.0:8080` |
    /// | `QUERYAUTH_SKEW_WINDOW_SECS` | `300` |
    /// | `QUERYAUTH_PURGE_INTERVAL_SECS` | `60` |
    /// | `QUERYAUTH_PURGE_ON_SAVE` | `false` |
    /// | `LOG_LEVEL` | `info` |
    /// | `API_KEY` | *(unset)* |
    /// | `API_SECRET` | *(unset)* |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("QUERYAUTH_LISTEN") {
            config.listen = v;
        }
        if let Ok(v) = std::env::var("QUERYAUTH_SKEW_WINDOW_SECS") {
            config.skew_window_secs = parse_secs("QUERYAUTH_SKEW_WINDOW_SECS", &v, 300);
        }
        if let Ok(v) = std::env::var("QUERYAUTH_PURGE_INTERVAL_SECS") {
            config.purge_interval_secs = parse_secs("QUERYAUTH_PURGE_INTERVAL_SECS", &v, 60);
        }
        if let Ok(v) = std::env::var("QUERYAUTH_PURGE_ON_SAVE") {
            config.purge_on_save = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        config.api_key = std::env::var("API_KEY").ok();
        config.api_secret = std::env::var("API_SECRET").ok();

        config
    }

    /// Check the configuration for values the protocol cannot work with.
    pub fn validate(&self) -> QueryAuthResult<()> {
        if self.skew_window_secs == 0 {
            return Err(QueryAuthError::Config(
                "skew window must be at least one second".to_owned(),
            ));
        }
        if i64::try_from(self.skew_window_secs).is_err() {
            return Err(QueryAuthError::Config(format!(
                "skew window is too large: {}",
                self.skew_window_secs
            )));
        }
        if self.purge_interval_secs == 0 {
            return Err(QueryAuthError::Config(
                "purge interval must be at least one second".to_owned(),
            ));
        }
        if self.api_key.is_some() != self.api_secret.is_some() {
            return Err(QueryAuthError::Config(
                "API_KEY and API_SECRET must be set together".to_owned(),
            ));
        }
        Ok(())
    }

    /// The configured credential pair, if both halves are present.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => Some(Credentials::new(key, secret)),
            _ => None,
        }
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v, "1" | "true" | "yes" | "TRUE" | "YES")
}

fn parse_secs(name: &str, v: &str, default: u64) -> u64 {
    v.trim().parse().unwrap_or_else(|_| {
        warn!(variable = name, value = v, default, "invalid integer, using default");
        default
    })
}
