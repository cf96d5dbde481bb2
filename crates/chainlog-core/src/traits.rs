//! The storage seam of chainlog.
//!
//! The core never implements a storage engine. It needs an ordered,
//! per-tenant record range with one concurrency primitive:
//! **compare-and-commit on the tenant tail**. Every append reads the tail,
//! computes the next record, and commits it only if the tail has not moved
//! in between. Losers get `AppendConflict` and retry from the tail read.

use chainlog_contracts::{
    error::ChainlogResult,
    query::{LogPage, LogQuery},
    record::{ChainTail, LogRecord, TenantId},
};

/// Ordered, transactional storage for per-tenant log chains.
///
/// Implementations are **trusted**: the chain invariants hold only if
/// `commit` is atomic and honors the expected tail. They must be
/// `Send + Sync`; appends for different tenants must not serialize behind a
/// global lock.
pub trait LogStore: Send + Sync {
    /// The highest-`seq` record of `tenant_id`, or `None` for an empty chain.
    fn tail(&self, tenant_id: &TenantId) -> ChainlogResult<Option<ChainTail>>;

    /// Atomically append `record` if the tenant's tail seq is still
    /// `expected_tail_seq` (0 for an empty chain).
    ///
    /// Must return `ChainlogError::AppendConflict` when the tail has moved or
    /// `(tenant_id, seq)` already exists, and must leave nothing visible on
    /// any failure. Returns the record as stored.
    fn commit(&self, record: LogRecord, expected_tail_seq: u64) -> ChainlogResult<LogRecord>;

    /// Every record of `tenant_id`, ordered by ascending `seq`.
    ///
    /// Read-only; a snapshot consistent with some point between commits.
    fn load_chain(&self, tenant_id: &TenantId) -> ChainlogResult<Vec<LogRecord>>;

    /// One page of `tenant_id`'s records matching `query`, newest first.
    ///
    /// Callers validate `query` first; implementations may assume it is
    /// well-formed.
    fn query(&self, tenant_id: &TenantId, query: &LogQuery) -> ChainlogResult<LogPage>;
}
