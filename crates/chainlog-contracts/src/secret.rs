//! The per-deployment HMAC key.

use std::fmt;

use crate::error::{ChainlogError, ChainlogResult};

/// Key material for the chain hasher.
///
/// `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    /// Wrap `key`. An empty key is a configuration error.
    pub fn new(key: impl Into<String>) -> ChainlogResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(ChainlogError::ConfigError {
                reason: "hashing secret is empty".to_string(),
            });
        }
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}
