//! # chainlog-core
//!
//! The stateful half of chainlog, written against a pluggable store.
//!
//! This crate provides:
//! - The `LogStore` trait, the single storage seam and its locking contract
//! - The `AppendEngine`, the only code path that creates records
//! - The `ChainVerifier`, which replays a stored chain into a `ChainReport`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainlog_core::{AppendEngine, ChainVerifier};
//!
//! let engine = AppendEngine::new(store.clone());
//! let record = engine.append(&request, &secret)?;
//!
//! let report = ChainVerifier::new(store).verify(&record.tenant_id, &secret)?;
//! assert!(report.valid);
//! ```

pub mod engine;
pub mod traits;
pub mod verifier;

pub use engine::{AppendEngine, DEFAULT_MAX_ATTEMPTS};
pub use traits::LogStore;
pub use verifier::ChainVerifier;
