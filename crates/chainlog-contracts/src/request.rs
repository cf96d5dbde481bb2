//! Append request and receipt shapes.
//!
//! `RawLogInput` is what a transport hands over (an untyped `log_type`
//! string and an optional JSON body). `AppendRequest` is the validated form
//! the append engine accepts. `AppendReceipt` is what goes back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{ChainlogError, ChainlogResult},
    log_type::LogType,
    record::{seq_string, LogRecord, Provenance, TenantId},
};

/// Untyped ingestion input as received from a transport.
///
/// An omitted `payload` becomes an empty object. An explicit `null` is kept
/// and rejected by validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLogInput {
    pub log_type: Option<String>,
    #[serde(default = "empty_object")]
    pub payload: Value,
}

impl Default for RawLogInput {
    fn default() -> Self {
        Self {
            log_type: None,
            payload: empty_object(),
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl RawLogInput {
    /// Validate and type this input for `tenant_id`.
    pub fn into_request(
        self,
        tenant_id: TenantId,
        provenance: Provenance,
    ) -> ChainlogResult<AppendRequest> {
        let log_type: LogType = self.log_type.as_deref().unwrap_or_default().parse()?;

        let request = AppendRequest {
            tenant_id,
            log_type,
            payload: self.payload,
            provenance,
        };
        request.validate()?;
        Ok(request)
    }
}

/// A validated request to append one record to a tenant's chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendRequest {
    pub tenant_id: TenantId,
    pub log_type: LogType,
    /// Raw payload; the engine canonicalizes it before hashing and storage.
    pub payload: Value,
    #[serde(default)]
    pub provenance: Provenance,
}

impl AppendRequest {
    /// Build and validate a request.
    pub fn new(
        tenant_id: impl Into<TenantId>,
        log_type: LogType,
        payload: Value,
    ) -> ChainlogResult<Self> {
        let request = Self {
            tenant_id: tenant_id.into(),
            log_type,
            payload,
            provenance: Provenance::default(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Reject requests the engine must never see.
    ///
    /// Top-level payloads must be an object or an array; null and scalars are
    /// invalid. The tenant id must be non-empty.
    pub fn validate(&self) -> ChainlogResult<()> {
        if self.tenant_id.as_str().is_empty() {
            return Err(ChainlogError::validation("tenant_id", "tenant_id is required"));
        }
        match self.payload {
            Value::Object(_) | Value::Array(_) => Ok(()),
            _ => Err(ChainlogError::validation(
                "payload",
                "payload must be object/array",
            )),
        }
    }
}

/// What the caller learns about a committed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendReceipt {
    pub id: Uuid,
    #[serde(with = "seq_string")]
    pub seq: u64,
    pub created_at: DateTime<Utc>,
    pub log_type: LogType,
}

impl From<&LogRecord> for AppendReceipt {
    fn from(record: &LogRecord) -> Self {
        Self {
            id: record.id,
            seq: record.seq,
            created_at: record.created_at,
            log_type: record.log_type,
        }
    }
}
