//! Keyed chain hashing.
//!
//! Hash input layout (UTF-8, fields joined by `|`, in order):
//!   1. tenant id
//!   2. seq as a decimal string
//!   3. uppercase log type
//!   4. compact JSON of the canonical payload (`{}` when absent)
//!   5. prev_hash (64 ASCII hex chars)
//!
//! The digest is HMAC-SHA256 keyed with the deployment secret, rendered as
//! lowercase hex.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use chainlog_contracts::{
    log_type::LogType,
    record::{LogRecord, TenantId},
    secret::SecretKey,
};

use crate::canonical::canonical_json;

type HmacSha256 = Hmac<Sha256>;

const FIELD_DELIMITER: &str = "|";

/// Compute the chain hash for one record.
///
/// `payload` may be raw or already canonical; it is canonicalized here
/// either way, so both give the same digest. Returns 64 lowercase hex chars.
pub fn compute_hash(
    tenant_id: &TenantId,
    seq: u64,
    log_type: LogType,
    payload: &Value,
    prev_hash: &str,
    secret: &SecretKey,
) -> String {
    let raw = [
        tenant_id.as_str(),
        &seq.to_string(),
        &log_type.as_str().to_uppercase(),
        &canonical_json(payload),
        prev_hash,
    ]
    .join(FIELD_DELIMITER);

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(raw.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Recompute `record`'s hash from its stored fields and compare it to the
/// stored `hash`.
pub fn verify_record(record: &LogRecord, secret: &SecretKey) -> bool {
    compute_hash(
        &record.tenant_id,
        record.seq,
        record.log_type,
        &record.payload,
        &record.prev_hash,
        secret,
    ) == record.hash
}
