//! Default constants for cursor coordination configuration
//!
//! These constants define the default values used throughout the configuration
//! system when no explicit value is provided.

use std::time::Duration;

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default commit timeout in seconds
///
/// Streams that do not commit delivered events within this window are
/// disconnected by the session manager.
pub const DEFAULT_COMMIT_TIMEOUT_SECS: u64 = 60;

/// Grace added on top of the commit timeout when resetting cursors
pub const RESET_GRACE: Duration = Duration::from_secs(1);

/// Environment variable overriding the commit timeout
pub const ENV_COMMIT_TIMEOUT_SECS: &str = "STREAMLINE_CURSORS_COMMIT_TIMEOUT_SECS";

/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "STREAMLINE_CURSORS_LOG_LEVEL";
