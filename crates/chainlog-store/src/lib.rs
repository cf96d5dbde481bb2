//! # chainlog-store
//!
//! Reference `LogStore` for chainlog: per-tenant chains held in memory,
//! guarded by per-tenant mutexes, with compare-and-commit appends.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chainlog_core::{AppendEngine, ChainVerifier};
//! use chainlog_store::InMemoryLogStore;
//!
//! let store = Arc::new(InMemoryLogStore::new());
//! let engine = AppendEngine::new(store.clone());
//! engine.append(&request, &secret)?;
//!
//! let report = ChainVerifier::new(store).verify(&tenant, &secret)?;
//! assert!(report.valid);
//! ```

pub mod memory;

pub use memory::InMemoryLogStore;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use serde_json::json;

    use chainlog_contracts::{
        error::ChainlogError,
        log_type::LogType,
        query::LogQuery,
        record::{TenantId, ZERO_SENTINEL},
        report::ChainFinding,
        request::AppendRequest,
        secret::SecretKey,
    };
    use chainlog_core::{traits::LogStore, AppendEngine, ChainVerifier};

    use super::InMemoryLogStore;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn secret() -> SecretKey {
        SecretKey::new("store-test-secret").unwrap()
    }

    fn request(tenant: &str, log_type: LogType, n: u64) -> AppendRequest {
        AppendRequest::new(tenant, log_type, json!({ "n": n, "tenant": tenant })).unwrap()
    }

    /// Store plus engine with `n` records already appended to `tenant`.
    fn seeded(tenant: &str, n: u64) -> (Arc<InMemoryLogStore>, AppendEngine) {
        let store = Arc::new(InMemoryLogStore::new());
        let engine = AppendEngine::new(store.clone());
        for i in 1..=n {
            engine
                .append(&request(tenant, LogType::DataCreate, i), &secret())
                .unwrap();
        }
        (store, engine)
    }

    fn verify(store: &Arc<InMemoryLogStore>, tenant: &str) -> chainlog_contracts::report::ChainReport {
        ChainVerifier::new(store.clone())
            .verify(&TenantId::new(tenant), &secret())
            .unwrap()
    }

    // ── Append + verify ───────────────────────────────────────────────────────

    /// Appending then verifying produces a valid, linked chain.
    #[test]
    fn test_chain_linkage() {
        let (store, _engine) = seeded("tenant-a", 4);
        let records = store.load_chain(&TenantId::new("tenant-a")).unwrap();

        assert_eq!(records[0].prev_hash, ZERO_SENTINEL);
        for i in 1..records.len() {
            assert_eq!(records[i].prev_hash, records[i - 1].hash);
            assert_eq!(records[i].seq, i as u64 + 1);
        }

        let report = verify(&store, "tenant-a");
        assert!(report.valid, "errors: {:?}", report.errors);
        assert_eq!(report.total_logs, 4);
    }

    /// Chains of different tenants are independent.
    #[test]
    fn test_tenants_are_partitioned() {
        let (store, engine) = seeded("tenant-a", 3);
        let first_b = engine
            .append(&request("tenant-b", LogType::AuthLogin, 1), &secret())
            .unwrap();

        assert_eq!(first_b.seq, 1);
        assert_eq!(first_b.prev_hash, ZERO_SENTINEL);
        assert_eq!(
            store.tenants().unwrap(),
            vec![TenantId::new("tenant-a"), TenantId::new("tenant-b")]
        );
        assert!(verify(&store, "tenant-a").valid);
        assert!(verify(&store, "tenant-b").valid);
    }

    /// Verifying a tenant with no records is valid and empty.
    #[test]
    fn test_verify_unknown_tenant() {
        let store = Arc::new(InMemoryLogStore::new());
        let report = verify(&store, "nobody");
        assert!(report.valid);
        assert_eq!(report.total_logs, 0);
        assert!(report.errors.is_empty());
    }

    /// The verifier's head is the last committed record.
    #[test]
    fn test_head_tracks_tail() {
        let (store, engine) = seeded("tenant-a", 2);
        let verifier = ChainVerifier::new(store.clone());
        assert_eq!(verifier.head(&TenantId::new("nobody")).unwrap(), None);

        let last = engine
            .append(&request("tenant-a", LogType::DataDelete, 3), &secret())
            .unwrap();
        let head = verifier.head(&TenantId::new("tenant-a")).unwrap().unwrap();
        assert_eq!(head, last.as_tail());
    }

    // ── Tampering ─────────────────────────────────────────────────────────────

    /// Deleting the middle record of three is reported as a gap at seq=3.
    #[test]
    fn test_gap_detection() {
        let (store, _engine) = seeded("tenant-a", 3);
        {
            let tenants = store.tenants.read().unwrap();
            let mut chain = tenants[&TenantId::new("tenant-a")].lock().unwrap();
            chain.records.retain(|r| r.seq != 2);
        }

        let report = verify(&store, "tenant-a");
        assert!(!report.valid);
        assert_eq!(report.first_invalid_seq, Some(3));
        assert!(report
            .findings
            .contains(&ChainFinding::SequenceGap { found: 3, expected: 2 }));
    }

    /// Mutating a stored payload is caught at that record only.
    #[test]
    fn test_tamper_detection() {
        let (store, _engine) = seeded("tenant-a", 3);
        {
            let tenants = store.tenants.read().unwrap();
            let mut chain = tenants[&TenantId::new("tenant-a")].lock().unwrap();
            chain.records[1].payload = json!({ "n": 2, "tenant": "TAMPERED" });
        }

        let report = verify(&store, "tenant-a");
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Invalid hash at seq=2".to_string()]);
        assert_eq!(report.first_invalid_seq, Some(2));
    }

    /// An exported, edited and re-imported chain fails verification.
    #[test]
    fn test_import_of_corrupted_export() {
        let (store, _engine) = seeded("tenant-a", 3);
        let mut records = store.export(&TenantId::new("tenant-a")).unwrap();
        records[0].prev_hash = "1".repeat(64);

        let fresh = Arc::new(InMemoryLogStore::new());
        fresh.import(records).unwrap();

        let report = verify(&fresh, "tenant-a");
        assert!(!report.valid);
        assert_eq!(report.findings[0], ChainFinding::BrokenGenesis { seq: 1 });
    }

    /// Records imported out of order are stored by seq, and appends continue
    /// from the highest one.
    #[test]
    fn test_import_sorts_and_appends_continue() {
        let (store, _engine) = seeded("tenant-a", 3);
        let mut records = store.export(&TenantId::new("tenant-a")).unwrap();
        records.reverse();

        let fresh = Arc::new(InMemoryLogStore::new());
        fresh.import(records).unwrap();
        let tail = fresh.tail(&TenantId::new("tenant-a")).unwrap().unwrap();
        assert_eq!(tail.seq, 3);

        let engine = AppendEngine::new(fresh.clone());
        let next = engine
            .append(&request("tenant-a", LogType::DataUpdate, 4), &secret())
            .unwrap();
        assert_eq!(next.seq, 4);
        assert_eq!(next.prev_hash, tail.hash);

        let seqs: Vec<u64> = fresh
            .load_chain(&TenantId::new("tenant-a"))
            .unwrap()
            .iter()
            .map(|r| r.seq)
            .collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
        assert!(verify(&fresh, "tenant-a").valid);
    }

    // ── Compare-and-commit ────────────────────────────────────────────────────

    /// A commit against a stale tail is rejected and nothing is written.
    #[test]
    fn test_stale_commit_rejected() {
        let (store, _engine) = seeded("tenant-a", 1);
        let mut stale = store.load_chain(&TenantId::new("tenant-a")).unwrap()[0].clone();
        stale.id = uuid::Uuid::new_v4();

        let err = store.commit(stale, 0).unwrap_err();
        assert!(matches!(err, ChainlogError::AppendConflict { expected_tail: 0, .. }));
        assert_eq!(store.export(&TenantId::new("tenant-a")).unwrap().len(), 1);
    }

    /// Two simultaneous appends to one tenant end up at seq 1 and 2.
    #[test]
    fn test_concurrent_append_race() {
        let store = Arc::new(InMemoryLogStore::new());
        let engine = Arc::new(AppendEngine::new(store.clone()));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|i| {
                let engine = engine.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    engine.append(&request("tenant-race", LogType::AuthLogin, i), &secret())
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let mut seqs: Vec<u64> = store
            .load_chain(&TenantId::new("tenant-race"))
            .unwrap()
            .iter()
            .map(|r| r.seq)
            .collect();
        seqs.sort();
        assert_eq!(seqs, vec![1, 2]);
        assert!(verify(&store, "tenant-race").valid);
    }

    /// Many writers across several tenants still produce contiguous chains.
    #[test]
    fn test_concurrent_appends_many_tenants() {
        let store = Arc::new(InMemoryLogStore::new());
        // Generous budget: eight writers per tenant can lose several races in a row.
        let engine = Arc::new(AppendEngine::new(store.clone()).with_max_attempts(64));

        let handles: Vec<_> = (0..24)
            .map(|i| {
                let engine = engine.clone();
                thread::spawn(move || {
                    let tenant = format!("tenant-{}", i % 3);
                    for n in 0..5 {
                        engine
                            .append(&request(&tenant, LogType::DataUpdate, n), &secret())
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for t in 0..3 {
            let tenant = format!("tenant-{}", t);
            let report = verify(&store, &tenant);
            assert!(report.valid, "{tenant}: {:?}", report.errors);
            assert_eq!(report.total_logs, 40);
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Query returns newest first, filtered and paginated.
    #[test]
    fn test_query_filters_and_pages() {
        let store = Arc::new(InMemoryLogStore::new());
        let engine = AppendEngine::new(store.clone());
        for n in 1..=10 {
            let log_type = if n % 2 == 0 { LogType::AuthLogin } else { LogType::AuthLogout };
            engine.append(&request("tenant-q", log_type, n), &secret()).unwrap();
        }

        let query = LogQuery {
            log_type: Some(LogType::AuthLogin),
            start_seq: Some(3),
            page: 1,
            limit: 2,
            ..LogQuery::default()
        };
        let page = store.query(&TenantId::new("tenant-q"), &query).unwrap();

        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages, 2);
        let seqs: Vec<u64> = page.records.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![10, 8]);
    }
}
