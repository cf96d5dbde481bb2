//! The closed set of log categories a record may carry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChainlogError;

/// Categorical tag attached to every log record.
///
/// Serialized and hashed in its uppercase wire form (e.g. `AUTH_LOGIN`).
/// Parsing is case-insensitive; anything outside this set is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogType {
    AuthLogin,
    AuthLogout,
    AuthLoginFailed,

    AccessEndpoint,
    DownloadDocument,
    SendExternal,

    DataCreate,
    DataUpdate,
    DataDelete,
    StatusChange,
    BulkImport,
    BulkExport,

    SystemError,
    ValidationFailed,

    SecurityViolation,
    PermissionChange,
}

impl LogType {
    /// Every accepted log type, in declaration order.
    pub const ALL: [LogType; 16] = [
        LogType::AuthLogin,
        LogType::AuthLogout,
        LogType::AuthLoginFailed,
        LogType::AccessEndpoint,
        LogType::DownloadDocument,
        LogType::SendExternal,
        LogType::DataCreate,
        LogType::DataUpdate,
        LogType::DataDelete,
        LogType::StatusChange,
        LogType::BulkImport,
        LogType::BulkExport,
        LogType::SystemError,
        LogType::ValidationFailed,
        LogType::SecurityViolation,
        LogType::PermissionChange,
    ];

    /// The uppercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::AuthLogin => "AUTH_LOGIN",
            LogType::AuthLogout => "AUTH_LOGOUT",
            LogType::AuthLoginFailed => "AUTH_LOGIN_FAILED",
            LogType::AccessEndpoint => "ACCESS_ENDPOINT",
            LogType::DownloadDocument => "DOWNLOAD_DOCUMENT",
            LogType::SendExternal => "SEND_EXTERNAL",
            LogType::DataCreate => "DATA_CREATE",
            LogType::DataUpdate => "DATA_UPDATE",
            LogType::DataDelete => "DATA_DELETE",
            LogType::StatusChange => "STATUS_CHANGE",
            LogType::BulkImport => "BULK_IMPORT",
            LogType::BulkExport => "BULK_EXPORT",
            LogType::SystemError => "SYSTEM_ERROR",
            LogType::ValidationFailed => "VALIDATION_FAILED",
            LogType::SecurityViolation => "SECURITY_VIOLATION",
            LogType::PermissionChange => "PERMISSION_CHANGE",
        }
    }

    fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(LogType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = ChainlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ChainlogError::validation("log_type", "log_type is required"));
        }

        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| {
                ChainlogError::validation(
                    "log_type",
                    format!(
                        "Invalid log_type: \"{}\". Allowed types: {}",
                        upper,
                        Self::allowed_list()
                    ),
                )
            })
    }
}
