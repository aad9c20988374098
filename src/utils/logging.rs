//! Logging configuration and setup

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize tracing based on configuration.
///
/// `RUST_LOG` overrides the configured level when set, so operators can
/// raise verbosity without touching the config file.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(())
}
