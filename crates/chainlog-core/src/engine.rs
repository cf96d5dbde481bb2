//! The append engine: the only code path that creates log records.
//!
//! Every append follows the same pipeline:
//!
//!   Validate → Canonicalize → [Tail → Hash → Commit]*
//!
//! The bracketed part is one attempt. A commit that loses a race against a
//! concurrent writer for the same tenant returns `AppendConflict`, and the
//! whole attempt is repeated from the tail read, up to `max_attempts` times.
//! Two records with the same `(tenant, seq)` can never both commit because
//! the store's compare-and-commit rejects the second one.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use chainlog_chain::{canonical_payload, compute_hash};
use chainlog_contracts::{
    error::{ChainlogError, ChainlogResult},
    record::{ChainTail, LogRecord},
    request::AppendRequest,
    secret::SecretKey,
};

use crate::traits::LogStore;

/// Attempts per append when the caller does not configure one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Appends records to tenant chains held in a `LogStore`.
///
/// Stateless between calls: the store is the only shared state, so one
/// engine can serve synchronous callers and queue workers at the same time.
pub struct AppendEngine {
    store: Arc<dyn LogStore>,
    max_attempts: u32,
}

impl AppendEngine {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the retry budget. Values below 1 are raised to 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }

    /// Append one record to `request.tenant_id`'s chain.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for a malformed request, before any storage access.
    /// - `AppendConflict` when every attempt lost a race for the tail.
    /// - `StorageError` from the store, returned without retry.
    pub fn append(&self, request: &AppendRequest, secret: &SecretKey) -> ChainlogResult<LogRecord> {
        request.validate()?;

        let payload = canonical_payload(&request.payload);
        let mut attempt = 1;

        loop {
            match self.try_append(request, &payload, secret) {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        tenant_id = %request.tenant_id,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "append lost tail race, retrying"
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// One tail-read → hash → compare-and-commit attempt.
    fn try_append(
        &self,
        request: &AppendRequest,
        payload: &Value,
        secret: &SecretKey,
    ) -> ChainlogResult<LogRecord> {
        let tenant_id = &request.tenant_id;

        let tail = self
            .store
            .tail(tenant_id)?
            .unwrap_or_else(ChainTail::genesis);

        debug!(tenant_id = %tenant_id, tail_seq = tail.seq, "read chain tail");

        let seq = tail.seq.checked_add(1).ok_or_else(|| ChainlogError::StorageError {
            reason: format!("sequence exhausted for tenant '{}'", tenant_id),
        })?;

        let hash = compute_hash(tenant_id, seq, request.log_type, payload, &tail.hash, secret);

        let record = LogRecord {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.clone(),
            seq,
            log_type: request.log_type,
            payload: payload.clone(),
            hash,
            prev_hash: tail.hash,
            ip_address: request.provenance.ip_address.clone(),
            user_agent: request.provenance.user_agent.clone(),
            created_at: Utc::now(),
        };

        let committed = self.store.commit(record, tail.seq)?;

        info!(
            tenant_id = %tenant_id,
            seq = committed.seq,
            log_type = %committed.log_type,
            id = %committed.id,
            "log record committed"
        );

        Ok(committed)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
