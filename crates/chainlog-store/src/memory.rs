//! In-memory implementation of `LogStore`.
//!
//! `InMemoryLogStore` is the reference implementation of the storage
//! contract. Each tenant's chain lives in its own `Mutex`, so appends for
//! different tenants never contend; the outer `RwLock` is only taken for
//! writing the first time a tenant is seen.
//!
//! `import` and `export` move raw records in and out without any chain
//! checks, which is how previously exported chains (possibly corrupted) are
//! loaded for verification.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::debug;

use chainlog_contracts::{
    error::{ChainlogError, ChainlogResult},
    query::{LogPage, LogQuery},
    record::{ChainTail, LogRecord, TenantId},
};
use chainlog_core::traits::LogStore;

// ── Internal mutable state ────────────────────────────────────────────────────

/// One tenant's records, ordered by ascending `seq`.
///
/// `import` sorts once and `commit` only pushes `tail + 1`, so the last
/// record is always the tail.
#[derive(Default)]
pub(crate) struct TenantChain {
    pub(crate) records: Vec<LogRecord>,
}

impl TenantChain {
    fn tail(&self) -> Option<&LogRecord> {
        self.records.last()
    }

    fn tail_seq(&self) -> u64 {
        self.tail().map_or(0, |r| r.seq)
    }
}

type TenantSlot = Arc<Mutex<TenantChain>>;

fn poisoned<T>(e: std::sync::PoisonError<T>) -> ChainlogError {
    ChainlogError::StorageError {
        reason: format!("log store lock poisoned: {}", e),
    }
}

// ── Public store ──────────────────────────────────────────────────────────────

/// An in-memory, per-tenant, append-only log store.
///
/// # Thread safety
///
/// All methods take `&self`. `commit` holds the tenant's mutex across the
/// tail comparison and the push, which is what makes it a compare-and-commit.
#[derive(Default)]
pub struct InMemoryLogStore {
    pub(crate) tenants: RwLock<HashMap<TenantId, TenantSlot>>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load raw records, grouped by their `tenant_id`, without chain checks.
    ///
    /// Each tenant's records are sorted by `seq`. Existing records for the
    /// same tenants are replaced.
    pub fn import(&self, records: Vec<LogRecord>) -> ChainlogResult<()> {
        let mut grouped: HashMap<TenantId, Vec<LogRecord>> = HashMap::new();
        for record in records {
            grouped.entry(record.tenant_id.clone()).or_default().push(record);
        }

        let mut tenants = self.tenants.write().map_err(poisoned)?;
        for (tenant_id, mut records) in grouped {
            records.sort_by_key(|r| r.seq);
            debug!(tenant_id = %tenant_id, count = records.len(), "imported records");
            tenants.insert(tenant_id, Arc::new(Mutex::new(TenantChain { records })));
        }
        Ok(())
    }

    /// Every stored record of `tenant_id`, by ascending `seq`.
    pub fn export(&self, tenant_id: &TenantId) -> ChainlogResult<Vec<LogRecord>> {
        let Some(slot) = self.slot(tenant_id)? else {
            return Ok(Vec::new());
        };
        let chain = lock(&slot)?;
        Ok(chain.records.clone())
    }

    /// Every tenant the store holds a chain slot for, sorted.
    pub fn tenants(&self) -> ChainlogResult<Vec<TenantId>> {
        let tenants = self.tenants.read().map_err(poisoned)?;
        let mut ids: Vec<TenantId> = tenants.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn slot(&self, tenant_id: &TenantId) -> ChainlogResult<Option<TenantSlot>> {
        let tenants = self.tenants.read().map_err(poisoned)?;
        Ok(tenants.get(tenant_id).cloned())
    }

    fn slot_or_create(&self, tenant_id: &TenantId) -> ChainlogResult<TenantSlot> {
        if let Some(slot) = self.slot(tenant_id)? {
            return Ok(slot);
        }
        let mut tenants = self.tenants.write().map_err(poisoned)?;
        Ok(tenants.entry(tenant_id.clone()).or_default().clone())
    }
}

fn lock(slot: &TenantSlot) -> ChainlogResult<MutexGuard<'_, TenantChain>> {
    slot.lock().map_err(poisoned)
}

// ── LogStore impl ─────────────────────────────────────────────────────────────

impl LogStore for InMemoryLogStore {
    fn tail(&self, tenant_id: &TenantId) -> ChainlogResult<Option<ChainTail>> {
        let Some(slot) = self.slot(tenant_id)? else {
            return Ok(None);
        };
        let chain = lock(&slot)?;
        Ok(chain.tail().map(LogRecord::as_tail))
    }

    /// Append `record` if the tenant's tail is still `expected_tail_seq`.
    ///
    /// The comparison and the push happen under the tenant's mutex, so two
    /// writers that read the same tail cannot both succeed.
    fn commit(&self, record: LogRecord, expected_tail_seq: u64) -> ChainlogResult<LogRecord> {
        let slot = self.slot_or_create(&record.tenant_id)?;
        let mut chain = lock(&slot)?;

        let tail_seq = chain.tail_seq();
        let extends_tail = tail_seq.checked_add(1) == Some(record.seq);
        if tail_seq != expected_tail_seq || !extends_tail {
            debug!(
                tenant_id = %record.tenant_id,
                expected_tail_seq,
                tail_seq,
                "commit rejected, tail moved"
            );
            return Err(ChainlogError::AppendConflict {
                tenant_id: record.tenant_id.to_string(),
                expected_tail: expected_tail_seq,
            });
        }

        chain.records.push(record.clone());
        Ok(record)
    }

    fn load_chain(&self, tenant_id: &TenantId) -> ChainlogResult<Vec<LogRecord>> {
        self.export(tenant_id)
    }

    fn query(&self, tenant_id: &TenantId, query: &LogQuery) -> ChainlogResult<LogPage> {
        let mut matching: Vec<LogRecord> = self
            .export(tenant_id)?
            .into_iter()
            .filter(|r| query.matches(r))
            .collect();
        matching.reverse();
        Ok(LogPage::paginate(matching, query))
    }
}
