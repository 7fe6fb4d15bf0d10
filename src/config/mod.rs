//! Configuration module for Streamline cursor coordination
//!
//! - `defaults` - Default constants and values
//! - `file` - TOML configuration file
//!
//! Configuration is loaded with this precedence:
//! 1. **Environment variables** (highest priority) - `STREAMLINE_CURSORS_*` prefix
//! 2. **Config file** - TOML configuration file
//! 3. **Built-in defaults** (lowest priority)

mod defaults;
pub mod file;

pub use defaults::*;
pub use file::ConfigFile;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, StreamlineError};

/// Settings the cursor service needs at runtime.
///
/// # Example
///
/// ```
/// use streamline_cursors::config::CursorsConfig;
/// use std::time::Duration;
///
/// let config = CursorsConfig::default();
/// assert_eq!(config.reset_timeout(), Duration::from_secs(61));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CursorsConfig {
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,

    /// Seconds a stream may hold uncommitted events before it is disconnected
    pub default_commit_timeout_secs: u64,
}

impl Default for CursorsConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            default_commit_timeout_secs: DEFAULT_COMMIT_TIMEOUT_SECS,
        }
    }
}

impl From<ConfigFile> for CursorsConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            log_level: file.logging.level,
            default_commit_timeout_secs: file.cursors.default_commit_timeout_secs,
        }
    }
}

impl CursorsConfig {
    /// Load from a TOML file, apply environment overrides and validate
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::from(ConfigFile::load(path)?);
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `STREAMLINE_CURSORS_*` environment variables on top of this config
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            if !level.trim().is_empty() {
                self.log_level = level.trim().to_string();
            }
        }

        if let Ok(raw) = std::env::var(ENV_COMMIT_TIMEOUT_SECS) {
            self.default_commit_timeout_secs = raw.trim().parse().map_err(|e| {
                StreamlineError::config(ENV_COMMIT_TIMEOUT_SECS, format!("'{}': {}", raw, e))
            })?;
        }

        Ok(())
    }

    /// Check values are usable
    pub fn validate(&self) -> Result<()> {
        if self.default_commit_timeout_secs == 0 {
            return Err(StreamlineError::config(
                "default_commit_timeout_secs",
                "must be at least 1",
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(StreamlineError::config("log_level", "must not be empty"));
        }
        Ok(())
    }

    /// Commit timeout as a duration
    pub fn commit_timeout(&self) -> Duration {
        Duration::from_secs(self.default_commit_timeout_secs)
    }

    /// Wall-clock bound for a cursor reset: commit timeout plus a fixed grace
    pub fn reset_timeout(&self) -> Duration {
        self.commit_timeout() + RESET_GRACE
    }
}
