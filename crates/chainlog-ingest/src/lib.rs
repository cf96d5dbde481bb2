//! # chainlog-ingest
//!
//! Deployment-facing layer of chainlog: TOML configuration, the synchronous
//! [`IngestService`], and the queued [`IngestQueue`] worker pool.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chainlog_ingest::{ChainlogConfig, IngestQueue, IngestService};
//! use chainlog_store::InMemoryLogStore;
//!
//! let config = ChainlogConfig::load(Some(Path::new("chainlog.toml")))?;
//! let service = IngestService::new(Arc::new(InMemoryLogStore::new()), config);
//! let receipt = service.append(tenant, raw_input, provenance)?;
//!
//! let (queue, mut outcomes) = IngestQueue::start(service.engine(), service.config())?;
//! let ticket = queue.submit(request).await?;
//! ```
//!
//! ## Secret resolution
//!
//! The HMAC key is read from the environment variable named by
//! `[hashing] secret_env` (default `LOG_HASH_KEY`), falling back to the
//! inline `[hashing] secret`. Neither being set is a `ConfigError`.

pub mod config;
pub mod queue;
pub mod service;
pub mod throttle;

pub use config::ChainlogConfig;
pub use queue::{IngestQueue, JobId, JobOutcome, JobTicket};
pub use service::IngestService;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use serde_json::json;

    use chainlog_contracts::{
        error::ChainlogError,
        log_type::LogType,
        query::LogQuery,
        record::{Provenance, TenantId},
        request::{AppendRequest, RawLogInput},
    };
    use chainlog_store::InMemoryLogStore;

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const TEST_CONFIG: &str = r#"
[hashing]
secret_env = "CHAINLOG_TEST_UNSET_KEY"
secret = "ingest-test-secret"

[append]
max_attempts = 16

[ingest]
workers = 4
rate_per_second = 0
queue_capacity = 8

[log]
level = "debug"
"#;

    fn config() -> ChainlogConfig {
        ChainlogConfig::from_toml_str(TEST_CONFIG).unwrap()
    }

    fn service() -> IngestService {
        IngestService::new(Arc::new(InMemoryLogStore::new()), config())
    }

    fn raw(log_type: &str, payload: serde_json::Value) -> RawLogInput {
        RawLogInput {
            log_type: Some(log_type.to_string()),
            payload,
        }
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    #[test]
    fn test_config_parses_all_sections() {
        let cfg = config();
        assert_eq!(cfg.hashing.secret_env, "CHAINLOG_TEST_UNSET_KEY");
        assert_eq!(cfg.append.max_attempts, 16);
        assert_eq!(cfg.ingest.workers, 4);
        assert_eq!(cfg.ingest.rate_per_second, 0);
        assert_eq!(cfg.ingest.queue_capacity, 8);
        assert_eq!(cfg.log.level, "debug");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = ChainlogConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.hashing.secret_env, "LOG_HASH_KEY");
        assert!(cfg.hashing.secret.is_none());
        assert_eq!(cfg.append.max_attempts, 3);
        assert_eq!(cfg.ingest.workers, 5);
        assert_eq!(cfg.ingest.rate_per_second, 100);
        assert_eq!(cfg.log.level, "info");
    }

    #[test]
    fn test_malformed_config_rejected() {
        let err = ChainlogConfig::from_toml_str("[append]\nmax_attempts = \"lots\"").unwrap_err();
        match err {
            ChainlogError::ConfigError { reason } => {
                assert!(reason.starts_with("failed to parse config TOML"), "{reason}")
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn test_worker_count_beyond_u32_rejected() {
        let err = ChainlogConfig::from_toml_str("[ingest]\nworkers = 5000000000").unwrap_err();
        assert!(matches!(err, ChainlogError::ConfigError { .. }));
    }

    #[test]
    fn test_missing_config_file_rejected() {
        let err = ChainlogConfig::load(Some(std::path::Path::new("/nonexistent/chainlog.toml")))
            .unwrap_err();
        assert!(matches!(err, ChainlogError::ConfigError { .. }));
    }

    #[test]
    fn test_secret_env_takes_precedence() {
        let cfg = config();
        let key = cfg
            .secret_key_with(|name| {
                (name == "CHAINLOG_TEST_UNSET_KEY").then(|| "from-env".to_string())
            })
            .unwrap();
        assert_eq!(key.as_bytes(), b"from-env");

        let key = cfg.secret_key_with(|_| None).unwrap();
        assert_eq!(key.as_bytes(), b"ingest-test-secret");
    }

    #[test]
    fn test_missing_secret_is_config_error() {
        let cfg = ChainlogConfig::default();
        let err = cfg.secret_key_with(|_| Some(String::new())).unwrap_err();
        assert_eq!(err.to_string(), "configuration error: LOG_HASH_KEY missing");
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("ingest-test-secret"));
    }

    // ── Synchronous ingestion ─────────────────────────────────────────────────

    #[test]
    fn test_store_verify_and_list() {
        let svc = service();
        let tenant = TenantId::new("tenant-sync");
        let provenance = Provenance {
            ip_address: Some("10.0.0.1".to_string()),
            user_agent: Some("curl/8".to_string()),
        };

        let first = svc
            .append(tenant.clone(), raw("auth_login", json!({ "user": "u1" })), provenance.clone())
            .unwrap();
        let second = svc
            .append(
                tenant.clone(),
                RawLogInput {
                    log_type: Some("AUTH_LOGOUT".to_string()),
                    ..RawLogInput::default()
                },
                provenance,
            )
            .unwrap();

        assert_eq!(first.seq, 1);
        assert_eq!(first.log_type, LogType::AuthLogin);
        assert_eq!(second.seq, 2);

        let report = svc.verify(&tenant).unwrap();
        assert!(report.valid, "{:?}", report.errors);
        assert_eq!(report.total_logs, 2);

        let page = svc.list(&tenant, &LogQuery::default()).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.records[0].seq, 2);
        assert_eq!(page.records[0].payload, json!({}));
        assert_eq!(page.records[1].ip_address.as_deref(), Some("10.0.0.1"));

        assert_eq!(svc.head(&tenant).unwrap().unwrap().seq, 2);
    }

    #[test]
    fn test_invalid_input_never_reaches_store() {
        let svc = service();
        let tenant = TenantId::new("tenant-bad");

        let err = svc
            .append(tenant.clone(), raw("NOT_A_TYPE", json!({})), Provenance::default())
            .unwrap_err();
        assert!(err.to_string().contains("Invalid log_type: \"NOT_A_TYPE\""), "{err}");

        let err = svc
            .append(tenant.clone(), raw("DATA_CREATE", json!("scalar")), Provenance::default())
            .unwrap_err();
        assert!(matches!(err, ChainlogError::ValidationFailed { .. }));

        let null_payload: RawLogInput =
            serde_json::from_str(r#"{"log_type":"DATA_CREATE","payload":null}"#).unwrap();
        let err = svc
            .append(tenant.clone(), null_payload, Provenance::default())
            .unwrap_err();
        assert!(matches!(err, ChainlogError::ValidationFailed { ref field, .. } if field == "payload"));

        assert!(svc.head(&tenant).unwrap().is_none());
    }

    #[test]
    fn test_missing_secret_fails_append() {
        let mut cfg = config();
        cfg.hashing.secret = None;
        let svc = IngestService::new(Arc::new(InMemoryLogStore::new()), cfg);

        let err = svc
            .append(TenantId::new("t"), raw("DATA_CREATE", json!({})), Provenance::default())
            .unwrap_err();
        assert!(matches!(err, ChainlogError::ConfigError { .. }));
        assert!(svc.head(&TenantId::new("t")).unwrap().is_none());
    }

    #[test]
    fn test_list_rejects_invalid_query() {
        let svc = service();
        let query = LogQuery {
            start_seq: Some(9),
            end_seq: Some(2),
            ..LogQuery::default()
        };
        let err = svc.list(&TenantId::new("t"), &query).unwrap_err();
        assert!(matches!(err, ChainlogError::ValidationFailed { .. }));
    }

    // ── Queued ingestion ──────────────────────────────────────────────────────

    /// Reads every outcome until the queue has shut down.
    fn collect_outcomes(
        mut outcomes: tokio::sync::mpsc::Receiver<JobOutcome>,
    ) -> tokio::task::JoinHandle<Vec<JobOutcome>> {
        tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(outcome) = outcomes.recv().await {
                seen.push(outcome);
            }
            seen
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_queue_produces_contiguous_chains() {
        let svc = service();
        let (queue, outcomes) = IngestQueue::start(svc.engine(), svc.config()).unwrap();
        let collector = collect_outcomes(outcomes);

        let mut job_ids = HashSet::new();
        for n in 0..30u64 {
            let tenant = if n % 2 == 0 { "tenant-even" } else { "tenant-odd" };
            let request = AppendRequest::new(tenant, LogType::DataCreate, json!({ "n": n })).unwrap();
            let ticket = queue.submit(request).await.unwrap();
            assert_eq!(ticket.status, "queued");
            assert!(job_ids.insert(ticket.job_id));
        }
        queue.shutdown().await;

        let completed = collector.await.unwrap();
        assert_eq!(completed.len(), 30);
        for outcome in completed {
            assert!(job_ids.contains(&outcome.job_id));
            outcome.result.unwrap();
        }

        for tenant in ["tenant-even", "tenant-odd"] {
            let report = svc.verify(&TenantId::new(tenant)).unwrap();
            assert!(report.valid, "{tenant}: {:?}", report.errors);
            assert_eq!(report.total_logs, 15);
        }
    }

    /// More jobs than the outcome buffer holds still all complete while the
    /// caller keeps reading.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_queue_outcomes_flow_through_small_buffer() {
        let mut cfg = config();
        cfg.ingest.workers = 1;
        cfg.ingest.queue_capacity = 1;
        let svc = IngestService::new(Arc::new(InMemoryLogStore::new()), cfg);
        let (queue, outcomes) = IngestQueue::start(svc.engine(), svc.config()).unwrap();
        let collector = collect_outcomes(outcomes);

        for n in 0..10u64 {
            let request =
                AppendRequest::new("tenant-small", LogType::BulkImport, json!({ "n": n })).unwrap();
            queue.submit(request).await.unwrap();
        }
        queue.shutdown().await;

        let completed = collector.await.unwrap();
        let mut seqs: Vec<u64> = completed
            .into_iter()
            .map(|outcome| outcome.result.unwrap().seq)
            .collect();
        seqs.sort();
        assert_eq!(seqs, (1..=10).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_queue_rejects_invalid_request() {
        let svc = service();
        let (queue, _outcomes) = IngestQueue::start(svc.engine(), svc.config()).unwrap();

        let mut request = AppendRequest::new("t", LogType::AccessEndpoint, json!({})).unwrap();
        request.payload = json!(null);
        let err = queue.submit(request).await.unwrap_err();
        assert!(matches!(err, ChainlogError::ValidationFailed { .. }));

        queue.shutdown().await;
    }

    #[tokio::test]
    async fn test_queue_start_requires_secret() {
        let mut cfg = config();
        cfg.hashing.secret = None;
        let svc = IngestService::new(Arc::new(InMemoryLogStore::new()), cfg);

        let err = IngestQueue::start(svc.engine(), svc.config()).err().unwrap();
        assert!(matches!(err, ChainlogError::ConfigError { .. }));
    }
}
