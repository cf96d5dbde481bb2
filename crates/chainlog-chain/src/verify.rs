//! Full-chain replay.
//!
//! `verify_records` walks a tenant's records in `seq` order and runs three
//! independent checks on every one of them:
//!
//! 1. **Continuity**: the record at index `i` has `seq == i + 1`.
//! 2. **Linkage**: `prev_hash` is the zero sentinel for index 0, and the
//!    stored `hash` of index `i - 1` otherwise.
//! 3. **Correctness**: the stored `hash` matches the recomputed one, using
//!    the stored `prev_hash` as-is.
//!
//! No check short-circuits another, and the pass never stops early, so one
//! class of corruption cannot hide a different one later in the chain.

use tracing::warn;

use chainlog_contracts::{
    record::{LogRecord, TenantId, ZERO_SENTINEL},
    report::{ChainFinding, ChainReport},
    secret::SecretKey,
};

use crate::hasher::compute_hash;

/// Verify `records` as the complete chain of `tenant_id`.
///
/// `records` must be ordered by ascending `seq`, which is what
/// `LogStore::load_chain` returns. Hashes are recomputed against
/// `tenant_id`, not the record's own tenant field, so a record spliced in
/// from another tenant's chain fails the correctness check.
pub fn verify_records(
    tenant_id: &TenantId,
    records: &[LogRecord],
    secret: &SecretKey,
) -> ChainReport {
    if records.is_empty() {
        return ChainReport::empty();
    }

    let mut findings = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let expected_seq = i as u64 + 1;

        if record.seq != expected_seq {
            findings.push(ChainFinding::SequenceGap {
                found: record.seq,
                expected: expected_seq,
            });
        }

        let expected_prev = match i {
            0 => ZERO_SENTINEL,
            _ => records[i - 1].hash.as_str(),
        };
        if record.prev_hash != expected_prev {
            findings.push(if i == 0 {
                ChainFinding::BrokenGenesis { seq: record.seq }
            } else {
                ChainFinding::ChainBroken { seq: record.seq }
            });
        }

        let recomputed = compute_hash(
            tenant_id,
            record.seq,
            record.log_type,
            &record.payload,
            &record.prev_hash,
            secret,
        );
        if recomputed != record.hash {
            findings.push(ChainFinding::InvalidHash { seq: record.seq });
        }
    }

    for finding in &findings {
        warn!(tenant_id = %tenant_id, seq = finding.seq(), finding = %finding, "chain integrity finding");
    }

    ChainReport::from_findings(records.len(), findings)
}
