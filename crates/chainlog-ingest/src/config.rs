//! TOML configuration for chainlog deployments.
//!
//! Every section and field has a default, so an empty document is a valid
//! configuration. The one value without a usable default is the hashing
//! secret, which is resolved at use time by `ChainlogConfig::secret_key`.
//!
//! Example:
//! ```toml
//! [hashing]
//! secret_env = "LOG_HASH_KEY"
//!
//! [append]
//! max_attempts = 3
//!
//! [ingest]
//! workers = 5
//! rate_per_second = 100
//! queue_capacity = 1024
//!
//! [log]
//! level = "info"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use chainlog_contracts::{
    error::{ChainlogError, ChainlogResult},
    secret::SecretKey,
};
use chainlog_core::DEFAULT_MAX_ATTEMPTS;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainlogConfig {
    pub hashing: HashingSection,
    pub append: AppendSection,
    pub ingest: IngestSection,
    pub log: LogSection,
}

/// `[hashing]` section.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingSection {
    /// Environment variable holding the HMAC key. Takes precedence over
    /// `secret` when set and non-empty.
    pub secret_env: String,

    /// Inline HMAC key, for local runs and tests.
    pub secret: Option<String>,
}

impl Default for HashingSection {
    fn default() -> Self {
        Self {
            secret_env: "LOG_HASH_KEY".to_string(),
            secret: None,
        }
    }
}

impl std::fmt::Debug for HashingSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashingSection")
            .field("secret_env", &self.secret_env)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// `[append]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendSection {
    /// Compare-and-commit attempts per append before `AppendConflict` is
    /// returned to the caller.
    pub max_attempts: u32,
}

impl Default for AppendSection {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// `[ingest]` section: the queued ingestion worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    /// Append jobs running at the same time.
    pub workers: u32,
    /// Ceiling on jobs started per second.
    pub rate_per_second: u32,
    /// Jobs that may wait in the queue before `submit` applies backpressure.
    /// Also bounds the number of unread job outcomes.
    pub queue_capacity: usize,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            workers: 5,
            rate_per_second: 100,
            queue_capacity: 1024,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`), used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ChainlogConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `ChainlogError::ConfigError` if the TOML is malformed or does
    /// not match the expected schema.
    pub fn from_toml_str(s: &str) -> ChainlogResult<Self> {
        toml::from_str(s).map_err(|e| ChainlogError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as TOML.
    pub fn from_file(path: &Path) -> ChainlogResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ChainlogError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load from `path`, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> ChainlogResult<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// Resolve the HMAC key from the process environment, then the inline value.
    pub fn secret_key(&self) -> ChainlogResult<SecretKey> {
        self.secret_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the HMAC key using `lookup` in place of the process environment.
    ///
    /// A missing or empty key is a `ConfigError`.
    pub fn secret_key_with<F>(&self, lookup: F) -> ChainlogResult<SecretKey>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = lookup(&self.hashing.secret_env).filter(|s| !s.is_empty());
        let from_file = self.hashing.secret.clone().filter(|s| !s.is_empty());

        match from_env.or(from_file) {
            Some(key) => SecretKey::new(key),
            None => Err(ChainlogError::ConfigError {
                reason: format!("{} missing", self.hashing.secret_env),
            }),
        }
    }
}
