//! Store-backed chain verification.
//!
//! `ChainVerifier` loads a tenant's full chain in one read and hands it to
//! `chainlog_chain::verify_records`. It takes no locks: a verification that
//! races an append simply reports on the prefix it observed.

use std::sync::Arc;

use tracing::info;

use chainlog_chain::verify_records;
use chainlog_contracts::{
    error::ChainlogResult,
    record::{ChainTail, TenantId},
    report::ChainReport,
    secret::SecretKey,
};

use crate::traits::LogStore;

pub struct ChainVerifier {
    store: Arc<dyn LogStore>,
}

impl ChainVerifier {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self { store }
    }

    /// Replay `tenant_id`'s chain and report every integrity finding.
    ///
    /// Corruption never produces an `Err`; only a failed storage read does.
    pub fn verify(&self, tenant_id: &TenantId, secret: &SecretKey) -> ChainlogResult<ChainReport> {
        let records = self.store.load_chain(tenant_id)?;
        let report = verify_records(tenant_id, &records, secret);

        info!(
            tenant_id = %tenant_id,
            total_logs = report.total_logs,
            valid = report.valid,
            findings = report.errors.len(),
            "chain verified"
        );

        Ok(report)
    }

    /// The tenant's current tail, a compact commitment to the whole chain.
    pub fn head(&self, tenant_id: &TenantId) -> ChainlogResult<Option<ChainTail>> {
        self.store.tail(tenant_id)
    }
}
