//! Logging bootstrap
//!
//! Installs a `tracing` subscriber with an env filter and a formatting layer.
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::CursorsConfig;
use crate::error::{Result, StreamlineError};

/// Build the filter used by [`init_logging`]
pub fn env_filter(config: &CursorsConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            StreamlineError::config("log_level", format!("'{}': {}", config.log_level, e))
        }),
    }
}

/// Initialize the global tracing subscriber
///
/// Fails instead of panicking when a global subscriber is already installed.
pub fn init_logging(config: &CursorsConfig) -> Result<()> {
    let filter = env_filter(config)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| StreamlineError::Internal(format!("Failed to install subscriber: {}", e)))
}
