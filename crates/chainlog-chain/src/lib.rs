//! # chainlog-chain
//!
//! The pure half of chainlog: payload canonicalization, HMAC-SHA256 chain
//! hashing, and full-chain verification.
//!
//! ## Overview
//!
//! Every record's hash commits to its tenant, position, type, canonical
//! payload and its predecessor's hash. Editing any record, dropping one, or
//! reordering them breaks either the hash of that record or the link from
//! the next, and `verify_records` reports it.
//!
//! Nothing here touches storage; `chainlog-core` wires these functions to a
//! `LogStore`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainlog_chain::{compute_hash, verify_records};
//!
//! let hash = compute_hash(&tenant, 1, LogType::AuthLogin, &payload, ZERO_SENTINEL, &secret);
//! let report = verify_records(&tenant, &records, &secret);
//! assert!(report.valid);
//! ```

pub mod canonical;
pub mod hasher;
pub mod verify;

pub use canonical::{canonical_json, canonical_payload, normalize};
pub use hasher::{compute_hash, verify_record};
pub use verify::verify_records;

// ── Tests ─────────────────────────────────────────────────────────────────────
