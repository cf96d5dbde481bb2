//! Log records and the identifiers that partition them into chains.
//!
//! A `LogRecord` is immutable once the append engine has committed it. Its
//! `hash` commits to the tenant, position, type, canonical payload and the
//! predecessor's hash; provenance fields ride along unhashed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::log_type::LogType;

/// The `prev_hash` of the first record in every chain: 64 ASCII zeros.
pub const ZERO_SENTINEL: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Identifier of the tenant ("application") that owns a chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where a log entry came from. Stored with the record, never hashed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// One committed entry in a tenant's hash chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    /// Assigned at creation, never reused.
    pub id: Uuid,

    pub tenant_id: TenantId,

    /// 1-based position in the tenant's chain. Rendered as a decimal string.
    #[serde(with = "seq_string")]
    pub seq: u64,

    pub log_type: LogType,

    /// Canonicalized payload, exactly as it was fed to the hasher.
    pub payload: serde_json::Value,

    /// Lowercase hex HMAC-SHA256 over this record's chain position and content.
    pub hash: String,

    /// `hash` of the record at `seq - 1`, or `ZERO_SENTINEL` for `seq == 1`.
    pub prev_hash: String,

    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LogRecord {
    /// The tail this record becomes once committed.
    pub fn as_tail(&self) -> ChainTail {
        ChainTail {
            seq: self.seq,
            hash: self.hash.clone(),
        }
    }
}

/// The highest-`seq` record of a chain, reduced to what the next append needs.
///
/// Also serves as a compact commitment to the whole chain: any change to an
/// earlier record changes every later hash, including this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainTail {
    #[serde(with = "seq_string")]
    pub seq: u64,
    pub hash: String,
}

impl ChainTail {
    /// The virtual tail of an empty chain.
    pub fn genesis() -> Self {
        Self {
            seq: 0,
            hash: ZERO_SENTINEL.to_string(),
        }
    }
}

/// Serde adapter rendering a sequence number as a decimal string.
///
/// Deserialization also accepts a bare JSON integer.
pub mod seq_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(crate) enum SeqRepr {
        Text(String),
        Number(u64),
    }

    impl SeqRepr {
        pub(crate) fn into_seq<E: Error>(self) -> Result<u64, E> {
            match self {
                SeqRepr::Text(s) => s
                    .parse()
                    .map_err(|e| E::custom(format!("invalid seq '{}': {}", s, e))),
                SeqRepr::Number(n) => Ok(n),
            }
        }
    }

    pub fn serialize<S: Serializer>(seq: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(seq)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        SeqRepr::deserialize(deserializer)?.into_seq()
    }
}

/// `seq_string` for optional sequence numbers.
pub mod opt_seq_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::seq_string::SeqRepr;

    pub fn serialize<S: Serializer>(seq: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match seq {
            Some(seq) => serializer.collect_str(seq),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        Option::<SeqRepr>::deserialize(deserializer)?
            .map(SeqRepr::into_seq)
            .transpose()
    }
}
