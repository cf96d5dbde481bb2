//! Chain verification report types.
//!
//! The verifier never fails on corruption. Every integrity problem it finds
//! becomes a `ChainFinding` inside the `ChainReport` it returns.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::opt_seq_string;

/// One integrity problem detected at a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainFinding {
    /// The record's `seq` does not match its position in the ordered chain.
    /// Catches deletions, reordering and duplicate insertion.
    SequenceGap { found: u64, expected: u64 },

    /// The first record does not link to the zero sentinel.
    BrokenGenesis { seq: u64 },

    /// `prev_hash` differs from the stored hash of the preceding record.
    ChainBroken { seq: u64 },

    /// The stored hash does not match the recomputed one.
    InvalidHash { seq: u64 },
}

impl ChainFinding {
    /// The stored `seq` of the record that produced this finding.
    pub fn seq(&self) -> u64 {
        match *self {
            ChainFinding::SequenceGap { found, .. } => found,
            ChainFinding::BrokenGenesis { seq }
            | ChainFinding::ChainBroken { seq }
            | ChainFinding::InvalidHash { seq } => seq,
        }
    }
}

impl fmt::Display for ChainFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFinding::SequenceGap { found, expected } => {
                write!(f, "Sequence gap at seq={}, expected={}", found, expected)
            }
            ChainFinding::BrokenGenesis { seq } => {
                write!(f, "First log (seq={}) prevHash should be 64 zeros", seq)
            }
            ChainFinding::ChainBroken { seq } => {
                write!(f, "Hash chain broken at seq={}, prevHash mismatch", seq)
            }
            ChainFinding::InvalidHash { seq } => write!(f, "Invalid hash at seq={}", seq),
        }
    }
}

/// The result of replaying a tenant's full chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    /// True only if no finding was recorded.
    pub valid: bool,

    /// Number of records scanned.
    pub total_logs: usize,

    /// Stored `seq` of the earliest record with any finding.
    #[serde(
        default,
        with = "opt_seq_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_invalid_seq: Option<u64>,

    /// Human-readable rendering of `findings`, in detection order.
    pub errors: Vec<String>,

    #[serde(skip)]
    pub findings: Vec<ChainFinding>,
}

impl ChainReport {
    /// Report for a tenant with no records.
    pub fn empty() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    /// Build a report from the findings of a full pass over `total_logs` records.
    pub fn from_findings(total_logs: usize, findings: Vec<ChainFinding>) -> Self {
        Self {
            valid: findings.is_empty(),
            total_logs,
            first_invalid_seq: findings.first().map(ChainFinding::seq),
            errors: findings.iter().map(ToString::to_string).collect(),
            findings,
        }
    }
}
