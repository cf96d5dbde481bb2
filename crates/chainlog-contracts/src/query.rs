//! Paginated, filtered listing of a tenant's records.

use serde::{Deserialize, Serialize};

use crate::{
    error::{ChainlogError, ChainlogResult},
    log_type::LogType,
    record::{opt_seq_string, LogRecord},
};

/// Largest page a single query may return.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Filters and pagination for listing records, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogQuery {
    pub log_type: Option<LogType>,

    /// Inclusive lower bound on `seq`.
    #[serde(default, with = "opt_seq_string", skip_serializing_if = "Option::is_none")]
    pub start_seq: Option<u64>,

    /// Inclusive upper bound on `seq`.
    #[serde(default, with = "opt_seq_string", skip_serializing_if = "Option::is_none")]
    pub end_seq: Option<u64>,

    /// 1-based page number.
    pub page: usize,

    /// Clamped into `1..=MAX_PAGE_LIMIT` by `effective_limit`.
    pub limit: usize,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            log_type: None,
            start_seq: None,
            end_seq: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl LogQuery {
    /// Reject malformed bounds before the query reaches storage.
    pub fn validate(&self) -> ChainlogResult<()> {
        if self.page == 0 {
            return Err(ChainlogError::validation("page", "page must be at least 1"));
        }
        if let (Some(start), Some(end)) = (self.start_seq, self.end_seq) {
            if start > end {
                return Err(ChainlogError::validation(
                    "start_seq",
                    format!("start_seq={} is greater than end_seq={}", start, end),
                ));
            }
        }
        Ok(())
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_PAGE_LIMIT)
    }

    /// Number of matching records to skip before this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.effective_limit())
    }

    /// True when `record` passes every filter (pagination aside).
    pub fn matches(&self, record: &LogRecord) -> bool {
        self.log_type.map_or(true, |t| record.log_type == t)
            && self.start_seq.map_or(true, |s| record.seq >= s)
            && self.end_seq.map_or(true, |e| record.seq <= e)
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub records: Vec<LogRecord>,
    pub page: usize,
    pub limit: usize,
    /// Matching records across all pages.
    pub total: usize,
    pub total_pages: usize,
}

impl LogPage {
    /// Slice the newest-first `matching` records down to the page `query` asks for.
    pub fn paginate(mut matching: Vec<LogRecord>, query: &LogQuery) -> Self {
        let limit = query.effective_limit();
        let total = matching.len();
        let records = matching
            .drain(..)
            .skip(query.offset())
            .take(limit)
            .collect();

        Self {
            records,
            page: query.page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
        }
    }
}
