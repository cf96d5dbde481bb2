//! Synchronous ingestion adapter.
//!
//! `IngestService` is what a request handler calls: it validates untyped
//! input, resolves the hashing secret, and delegates to the shared
//! `AppendEngine` and `ChainVerifier`. It holds no per-request state.
//!
//! Order of checks on append:
//!
//! 1. Input validation (`log_type`, payload shape) → `ValidationFailed`
//! 2. Secret resolution → `ConfigError`
//! 3. `AppendEngine::append`

use std::sync::Arc;

use tracing::debug;

use chainlog_contracts::{
    error::ChainlogResult,
    query::{LogPage, LogQuery},
    record::{ChainTail, Provenance, TenantId},
    report::ChainReport,
    request::{AppendReceipt, RawLogInput},
};
use chainlog_core::{traits::LogStore, AppendEngine, ChainVerifier};

use crate::config::ChainlogConfig;

pub struct IngestService {
    store: Arc<dyn LogStore>,
    engine: Arc<AppendEngine>,
    verifier: ChainVerifier,
    config: ChainlogConfig,
}

impl IngestService {
    /// Build the engine and verifier over `store` using `config`.
    pub fn new(store: Arc<dyn LogStore>, config: ChainlogConfig) -> Self {
        let engine =
            Arc::new(AppendEngine::new(store.clone()).with_max_attempts(config.append.max_attempts));
        Self {
            verifier: ChainVerifier::new(store.clone()),
            store,
            engine,
            config,
        }
    }

    /// The shared engine, for handing to an `IngestQueue`.
    pub fn engine(&self) -> Arc<AppendEngine> {
        self.engine.clone()
    }

    pub fn config(&self) -> &ChainlogConfig {
        &self.config
    }

    /// Validate `input` and append it to `tenant_id`'s chain.
    pub fn append(
        &self,
        tenant_id: TenantId,
        input: RawLogInput,
        provenance: Provenance,
    ) -> ChainlogResult<AppendReceipt> {
        let request = input.into_request(tenant_id, provenance)?;
        let secret = self.config.secret_key()?;

        debug!(tenant_id = %request.tenant_id, log_type = %request.log_type, "storing log");

        let record = self.engine.append(&request, &secret)?;
        Ok(AppendReceipt::from(&record))
    }

    /// Verify `tenant_id`'s full chain.
    pub fn verify(&self, tenant_id: &TenantId) -> ChainlogResult<ChainReport> {
        let secret = self.config.secret_key()?;
        self.verifier.verify(tenant_id, &secret)
    }

    /// List `tenant_id`'s records, newest first.
    pub fn list(&self, tenant_id: &TenantId, query: &LogQuery) -> ChainlogResult<LogPage> {
        query.validate()?;
        self.store.query(tenant_id, query)
    }

    pub fn head(&self, tenant_id: &TenantId) -> ChainlogResult<Option<ChainTail>> {
        self.verifier.head(tenant_id)
    }
}
