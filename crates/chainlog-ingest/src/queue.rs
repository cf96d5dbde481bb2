//! Queued ingestion: a bounded worker pool in front of the append engine.
//!
//! `submit` returns as soon as the job is queued. A dispatcher task pulls
//! jobs off the queue, waits for the throttle and a worker permit, then runs
//! `AppendEngine::append` on the blocking pool. Each finished job is reported
//! on the outcome channel returned by `start`.
//!
//! The outcome channel holds at most `queue_capacity` unread outcomes. A
//! caller that stops reading it stalls the workers, and then `submit`.
//!
//! Workers racing on the same tenant are serialized by the engine's
//! compare-and-commit, so the pool never produces duplicate or skipped seqs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use chainlog_contracts::{
    error::{ChainlogError, ChainlogResult},
    log_type::LogType,
    record::TenantId,
    request::{AppendReceipt, AppendRequest},
    secret::SecretKey,
};
use chainlog_core::AppendEngine;

use crate::{config::ChainlogConfig, throttle::Throttle};

/// Identifier of a queued append job, unique per queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Acknowledgement handed back by `submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTicket {
    pub job_id: JobId,
    pub log_type: LogType,
    pub status: String,
}

/// Result of one queued append.
#[derive(Debug)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub tenant_id: TenantId,
    pub result: ChainlogResult<AppendReceipt>,
}

struct Job {
    id: JobId,
    request: AppendRequest,
}

pub struct IngestQueue {
    jobs: mpsc::Sender<Job>,
    next_id: AtomicU64,
    dispatcher: JoinHandle<()>,
}

impl IngestQueue {
    /// Start the dispatcher on the current tokio runtime.
    ///
    /// The hashing secret is resolved once here; a missing secret fails the
    /// start rather than every job.
    pub fn start(
        engine: Arc<AppendEngine>,
        config: &ChainlogConfig,
    ) -> ChainlogResult<(Self, mpsc::Receiver<JobOutcome>)> {
        let secret = config.secret_key()?;
        Ok(Self::start_with_secret(engine, secret, config))
    }

    /// Start the dispatcher with an already resolved secret.
    pub fn start_with_secret(
        engine: Arc<AppendEngine>,
        secret: SecretKey,
        config: &ChainlogConfig,
    ) -> (Self, mpsc::Receiver<JobOutcome>) {
        let settings = &config.ingest;
        let workers = settings.workers.max(1);
        let capacity = settings.queue_capacity.max(1);
        let (job_tx, job_rx) = mpsc::channel(capacity);
        let (outcome_tx, outcome_rx) = mpsc::channel(capacity);
        let throttle = Arc::new(Throttle::new(settings.rate_per_second));

        info!(
            workers,
            rate_per_second = settings.rate_per_second,
            queue_capacity = settings.queue_capacity,
            "ingest queue started"
        );

        let dispatcher = tokio::spawn(dispatch(
            job_rx, engine, secret, workers, throttle, outcome_tx,
        ));

        let queue = Self {
            jobs: job_tx,
            next_id: AtomicU64::new(1),
            dispatcher,
        };
        (queue, outcome_rx)
    }

    /// Queue `request`, waiting for room if the queue is full.
    pub async fn submit(&self, request: AppendRequest) -> ChainlogResult<JobTicket> {
        request.validate()?;

        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let ticket = JobTicket {
            job_id: id,
            log_type: request.log_type,
            status: "queued".to_string(),
        };

        self.jobs
            .send(Job { id, request })
            .await
            .map_err(|_| ChainlogError::StorageError {
                reason: "ingest queue is closed".to_string(),
            })?;

        Ok(ticket)
    }

    /// Stop accepting jobs and wait for every queued job to finish.
    pub async fn shutdown(self) {
        drop(self.jobs);
        if let Err(e) = self.dispatcher.await {
            error!(error = %e, "ingest dispatcher terminated abnormally");
        }
    }
}

async fn dispatch(
    mut jobs: mpsc::Receiver<Job>,
    engine: Arc<AppendEngine>,
    secret: SecretKey,
    workers: u32,
    throttle: Arc<Throttle>,
    outcomes: mpsc::Sender<JobOutcome>,
) {
    let concurrency = Arc::new(Semaphore::new(workers as usize));

    while let Some(job) = jobs.recv().await {
        throttle.acquire().await;

        let Ok(permit) = concurrency.clone().acquire_owned().await else {
            break;
        };

        let engine = engine.clone();
        let secret = secret.clone();
        let outcomes = outcomes.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let Job { id, request } = job;
            let tenant_id = request.tenant_id.clone();

            let result = tokio::task::spawn_blocking(move || {
                engine
                    .append(&request, &secret)
                    .map(|record| AppendReceipt::from(&record))
            })
            .await
            .unwrap_or_else(|e| {
                Err(ChainlogError::StorageError {
                    reason: format!("append task failed: {}", e),
                })
            });

            match &result {
                Ok(receipt) => {
                    info!(job_id = %id, tenant_id = %tenant_id, seq = receipt.seq, "job completed")
                }
                Err(e) => error!(job_id = %id, tenant_id = %tenant_id, error = %e, "job failed"),
            }

            if outcomes
                .send(JobOutcome {
                    job_id: id,
                    tenant_id,
                    result,
                })
                .await
                .is_err()
            {
                warn!(job_id = %id, "outcome receiver dropped");
            }
        });
    }

    // Every in-flight job holds a permit until it has reported.
    let _drained = concurrency.acquire_many(workers).await;
    info!("ingest queue drained");
}
