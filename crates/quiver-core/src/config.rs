//! Configuration management for Quiver.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`QUIVER__STORE__` prefix, e.g. `QUIVER__STORE__HOST`)
//! 2. Config file (`quiver.toml`, `[store]` section)
//! 3. Defaults

use std::time::Duration;

use serde::Deserialize;

use crate::error::{CoreError, Result};

/// Connection parameters for the Dgraph alpha gRPC endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Hostname of the Dgraph alpha (default: "localhost").
    #[serde(default = "default_host")]
    pub host: String,

    /// gRPC port of the Dgraph alpha (default: 9080).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Dial timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Deadline attached to the drop-all alteration, in seconds.
    #[serde(default = "default_drop_all_timeout")]
    pub drop_all_timeout_secs: u64,

    /// Send gzip-compressed requests and accept gzip responses.
    #[serde(default = "default_true")]
    pub gzip: bool,
}

impl StoreConfig {
    /// Config for `host:port` with defaults for everything else.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Reject parameters that can never be dialed.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(CoreError::Config("store.host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(CoreError::Config("store.port must be non-zero".to_string()));
        }
        Ok(())
    }

    /// `host:port` as dialed by the transport.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Plaintext HTTP/2 URI for the gRPC endpoint.
    pub fn endpoint_uri(&self) -> String {
        format!("http://{}", self.address())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn drop_all_timeout(&self) -> Duration {
        Duration::from_secs(self.drop_all_timeout_secs)
    }

    /// Load the `[store]` section from `<file_prefix>.toml` (optional) and
    /// `QUIVER__STORE__*` environment variables, then validate it.
    ///
    /// A missing `[store]` section yields the defaults; a malformed one is an error.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let store = Self::load_unvalidated(file_prefix)?;
        store.validate()?;
        Ok(store)
    }

    /// Like [`StoreConfig::load`] but skips validation, for callers that apply
    /// their own overrides first.
    pub fn load_unvalidated(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("QUIVER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let store = match cfg.get::<StoreConfig>("store") {
            Ok(c) => c,
            Err(config::ConfigError::NotFound(_)) => {
                tracing::debug!(file_prefix, "No [store] section found, using defaults");
                StoreConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(store)
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9080
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_drop_all_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout(),
            drop_all_timeout_secs: default_drop_all_timeout(),
            gzip: default_true(),
        }
    }
}
