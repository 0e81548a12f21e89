//! Logging setup for the server binary.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Builds the level filter: `RUST_LOG` when set, the configured level
/// otherwise.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Installs the global `tracing` subscriber.
///
/// Installation failures (a subscriber is already set) are logged and
/// otherwise ignored.
pub fn init_logging(config: &LoggingConfig) {
    let builder = fmt().with_env_filter(env_filter(config));
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
