//! External status codes for cursor coordination failures

/// Status an outer (HTTP) layer reports for a failed cursor operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorStatus {
    /// Caller lacks a required read scope
    Forbidden = 403,
    /// Subscription or event type does not exist
    NotFound = 404,
    /// Request is well-formed but cannot be applied
    UnprocessableEntity = 422,
    /// Unexpected internal failure
    InternalServerError = 500,
    /// Coordination store unreachable or commit retries exhausted
    ServiceUnavailable = 503,
    /// Reset did not finish inside its grace window
    GatewayTimeout = 504,
}

impl ErrorStatus {
    /// Returns true if a client may retry the same request unchanged
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ErrorStatus::ServiceUnavailable | ErrorStatus::GatewayTimeout
        )
    }

    /// Numeric status code
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}
