//! Configuration file support for cursor coordination
//!
//! ## Example Configuration
//!
//! ```toml
//! # streamline-cursors.toml
//!
//! [cursors]
//! default_commit_timeout_secs = 60
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, StreamlineError};

use super::defaults::{DEFAULT_COMMIT_TIMEOUT_SECS, DEFAULT_LOG_LEVEL};

/// Root configuration structure for TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigFile {
    /// Cursor commit/reset settings
    pub cursors: CursorsSection,

    /// Logging settings
    pub logging: LoggingSection,
}

/// `[cursors]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CursorsSection {
    pub default_commit_timeout_secs: u64,
}

impl Default for CursorsSection {
    fn default() -> Self {
        Self {
            default_commit_timeout_secs: DEFAULT_COMMIT_TIMEOUT_SECS,
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents).map_err(|e| match e {
            StreamlineError::Config(msg) => {
                StreamlineError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| StreamlineError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Render a commented example configuration
    pub fn example() -> String {
        format!(
            "# Streamline cursor coordination\n\n[cursors]\n# Seconds a stream may hold uncommitted events\ndefault_commit_timeout_secs = {}\n\n[logging]\nlevel = \"{}\"\n",
            DEFAULT_COMMIT_TIMEOUT_SECS, DEFAULT_LOG_LEVEL
        )
    }
}
