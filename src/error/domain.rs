//! Domain-specific error types for Streamline cursor coordination

use thiserror::Error;

/// Structured coordination store error domain
///
/// These are the failures a [`CoordinationStore`](crate::coordination::CoordinationStore)
/// reports. Callers decide which of them are expected (an absent node, a lost
/// version race) and which are fatal for the current operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinationError {
    #[error("node does not exist: {0}")]
    NoNode(String),
    #[error("node already exists: {0}")]
    NodeExists(String),
    #[error("version mismatch on {path}: expected {expected}")]
    BadVersion { path: String, expected: i32 },
    #[error("connection lost: {0}")]
    ConnectionLoss(String),
    #[error("not authorized: {0}")]
    NotAuthorized(String),
}

impl CoordinationError {
    pub fn no_node(path: impl Into<String>) -> Self {
        Self::NoNode(path.into())
    }

    pub fn node_exists(path: impl Into<String>) -> Self {
        Self::NodeExists(path.into())
    }

    pub fn bad_version(path: impl Into<String>, expected: i32) -> Self {
        Self::BadVersion {
            path: path.into(),
            expected,
        }
    }

    pub fn connection_loss(detail: impl Into<String>) -> Self {
        Self::ConnectionLoss(detail.into())
    }

    /// True when the failure means "somebody else wrote first"
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::BadVersion { .. } | Self::NodeExists(_))
    }

    pub fn is_no_node(&self) -> bool {
        matches!(self, Self::NoNode(_))
    }
}

/// Storage-level reasons a cursor is rejected
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CursorError {
    #[error("partition not found")]
    PartitionNotFound,
    #[error("offset must not be empty")]
    NullOffset,
    #[error("partition must not be empty")]
    NullPartition,
    #[error("invalid offset format")]
    InvalidFormat,
    #[error("offset is not available")]
    Unavailable,
}

/// Structured configuration error domain
#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("{setting}: {reason}")]
    InvalidSetting { setting: String, reason: String },
}

impl ConfigError {
    pub fn invalid_setting(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            setting: setting.into(),
            reason: reason.into(),
        }
    }
}
