//! Tracing setup for hosts of the studio
//!
//! Opt-in: embedders that install their own subscriber never call this.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured filter
pub const LOG_ENV: &str = "VIZ_LOG";

/// Filter from `VIZ_LOG`, then `RUST_LOG`, then `fallback`
#[must_use]
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a global fmt subscriber
///
/// Returns `false` if a global subscriber was already set by the host.
#[must_use]
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = env_filter(&config.filter);
    if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok()
    }
}
