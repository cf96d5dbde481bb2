//! Error types for the chainlog append and verification paths.
//!
//! Every fallible operation returns `ChainlogResult<T>`. Chain corruption is
//! absent from this enum: the verifier reports it as a finding
//! inside a `ChainReport`, it never raises it.

use thiserror::Error;

/// The unified error type for chainlog.
#[derive(Debug, Error)]
pub enum ChainlogError {
    /// A required configuration value is missing or invalid.
    ///
    /// Fatal to the operation and never retried. The most common cause is an
    /// absent hashing secret.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// Caller input was rejected before any storage access.
    #[error("validation failed on '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Another writer committed to the tenant's chain between our tail read
    /// and our commit. Safe to retry the whole append.
    #[error("append conflict for tenant '{tenant_id}': tail moved past seq={expected_tail}")]
    AppendConflict { tenant_id: String, expected_tail: u64 },

    /// The backing store failed. Nothing from the failed operation is visible.
    #[error("storage error: {reason}")]
    StorageError { reason: String },
}

impl ChainlogError {
    /// Shorthand for a `ValidationFailed` on `field`.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True when repeating the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AppendConflict { .. })
    }
}

/// Convenience alias used throughout the chainlog crates.
pub type ChainlogResult<T> = Result<T, ChainlogError>;
