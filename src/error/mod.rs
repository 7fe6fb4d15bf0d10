//! Error types for Streamline cursor coordination
//!
//! This module defines the closed set of failures the cursor layer reports and
//! their mapping to the status an outer request layer returns to clients.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::cursors::Cursor;

mod domain;
mod hints;
mod status;

pub use domain::{ConfigError, CoordinationError, CursorError};
pub use hints::ErrorHint;
pub use status::ErrorStatus;

/// Result type alias for cursor operations
pub type Result<T> = std::result::Result<T, StreamlineError>;

/// Main error type for cursor coordination
#[derive(Error, Debug)]
pub enum StreamlineError {
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid cursor {cursor}: {error}")]
    InvalidCursor {
        error: CursorError,
        cursor: Box<Cursor>,
    },

    #[error("Invalid stream id: {0}")]
    InvalidStreamId(String),

    #[error("Client has none of the required scopes: {}", format_scopes(.0))]
    IllegalScope(BTreeSet<String>),

    #[error("Unable to process: {0}")]
    UnableToProcess(String),

    #[error("Operation timed out: {0}")]
    OperationTimeout(String),

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),

    #[error("Event type not found: {0}")]
    EventTypeNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    ConfigDomain(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_scopes(scopes: &BTreeSet<String>) -> String {
    scopes.iter().cloned().collect::<Vec<_>>().join(", ")
}

pub(crate) const ERROR_COMMUNICATING_WITH_COORDINATION: &str =
    "Error communicating with coordination store";

impl StreamlineError {
    /// Create a service-unavailable error from a coordination failure
    pub fn coordination(operation: &str, source: &CoordinationError) -> Self {
        StreamlineError::ServiceUnavailable(format!(
            "{}: {}: {}",
            ERROR_COMMUNICATING_WITH_COORDINATION, operation, source
        ))
    }

    /// Create an invalid-cursor error for a specific cursor
    pub fn invalid_cursor(error: CursorError, cursor: &Cursor) -> Self {
        StreamlineError::InvalidCursor {
            error,
            cursor: Box::new(cursor.clone()),
        }
    }

    /// Create a configuration error with context
    pub fn config(setting: &str, reason: impl Into<String>) -> Self {
        StreamlineError::ConfigDomain(ConfigError::invalid_setting(setting, reason))
    }

    /// Status an outer request layer reports for this error
    pub fn status(&self) -> ErrorStatus {
        match self {
            StreamlineError::ServiceUnavailable(_) => ErrorStatus::ServiceUnavailable,
            StreamlineError::InvalidCursor { .. } => ErrorStatus::UnprocessableEntity,
            StreamlineError::InvalidStreamId(_) => ErrorStatus::UnprocessableEntity,
            StreamlineError::IllegalScope(_) => ErrorStatus::Forbidden,
            StreamlineError::UnableToProcess(_) => ErrorStatus::UnprocessableEntity,
            StreamlineError::OperationTimeout(_) => ErrorStatus::GatewayTimeout,
            StreamlineError::SubscriptionNotFound(_) => ErrorStatus::NotFound,
            StreamlineError::EventTypeNotFound(_) => ErrorStatus::NotFound,
            StreamlineError::Config(_) | StreamlineError::ConfigDomain(_) => {
                ErrorStatus::InternalServerError
            }
            StreamlineError::Io(_) => ErrorStatus::InternalServerError,
            StreamlineError::Serialization(_) => ErrorStatus::InternalServerError,
            StreamlineError::Internal(_) => ErrorStatus::InternalServerError,
        }
    }

    /// Returns true if the caller should retry later
    pub fn is_retriable(&self) -> bool {
        self.status().is_retriable()
    }
}

impl From<&StreamlineError> for u16 {
    fn from(err: &StreamlineError) -> u16 {
        err.status().as_u16()
    }
}
