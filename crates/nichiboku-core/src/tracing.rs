//! Tracing subscriber setup.
//!
//! `NICHIBOKU_LOG` takes precedence over the configured filter. Safe to call
//! more than once: only the first call installs a subscriber.

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

pub const LOG_ENV_VAR: &str = "NICHIBOKU_LOG";

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
