//! Error hints for actionable error messages

use super::{CursorError, StreamlineError};

/// Extension trait for adding hints to errors
pub trait ErrorHint {
    /// Get a helpful hint for resolving this error
    fn hint(&self) -> Option<String>;

    /// Format the error with hint for display
    fn with_hint(&self) -> String;
}

impl ErrorHint for StreamlineError {
    fn hint(&self) -> Option<String> {
        match self {
            StreamlineError::ServiceUnavailable(_) => Some(
                "The coordination store is unreachable or the partition is heavily contended. Retry the request later".into()
            ),
            StreamlineError::InvalidCursor {
                error: CursorError::PartitionNotFound,
                cursor,
            } => Some(format!(
                "Partition {} of event type '{}' is not assigned in this subscription. Re-read the subscription cursors and commit only partitions you received",
                cursor.partition,
                cursor.event_type()
            )),
            StreamlineError::InvalidCursor { cursor, .. } => Some(format!(
                "Offset '{}' is not valid for partition {} of '{}'. Commit the cursor exactly as it was delivered in the stream",
                cursor.offset,
                cursor.partition,
                cursor.event_type()
            )),
            StreamlineError::InvalidStreamId(_) => Some(
                "The stream is no longer attached to this subscription or does not own these partitions. Reconnect and commit with the new stream id".into()
            ),
            StreamlineError::IllegalScope(scopes) => Some(format!(
                "Grant the client one of these scopes: {}",
                scopes.iter().cloned().collect::<Vec<_>>().join(", ")
            )),
            StreamlineError::UnableToProcess(_) => Some(
                "Check that every cursor belongs to an event type of the subscription and that the cursor list is not empty".into()
            ),
            StreamlineError::OperationTimeout(_) => Some(
                "Reset could not finish while other streams were committing. Retry the reset".into()
            ),
            StreamlineError::SubscriptionNotFound(id) => Some(format!(
                "Subscription '{}' does not exist. Check the subscription id",
                id
            )),
            StreamlineError::EventTypeNotFound(name) => Some(format!(
                "Event type '{}' no longer exists. The subscription refers to a deleted event type",
                name
            )),
            StreamlineError::Config(_) | StreamlineError::ConfigDomain(_) => Some(
                "Validate the [cursors] section of the configuration file and the STREAMLINE_CURSORS_* environment variables".into()
            ),
            _ => None,
        }
    }

    fn with_hint(&self) -> String {
        let error_msg = self.to_string();
        match self.hint() {
            Some(hint) => format!("{}\n  hint: {}", error_msg, hint),
            None => error_msg,
        }
    }
}
