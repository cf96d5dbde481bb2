//! # chainlog-contracts
//!
//! Shared types for the chainlog workspace: log records, append requests and
//! receipts, verification reports, query shapes and the error type.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate beyond input validation.

pub mod error;
pub mod log_type;
pub mod query;
pub mod record;
pub mod report;
pub mod request;
pub mod secret;
