//! # Logging
//!
//! Tracing subscriber setup shared by the server and `kpctl`.
//!
//! `RUST_LOG` wins when set; otherwise `LOG_LEVEL` applies to this crate only.

use crate::config::ControllerConfig;
use crate::constants::DEFAULT_LOG_FILTER;
use tracing_subscriber::EnvFilter;

/// Build the filter from `RUST_LOG` or the configured level
pub fn env_filter(config: &ControllerConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = config.log_level.to_lowercase();
        EnvFilter::try_new(format!("kubeportal_sync={level}"))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    })
}

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(config: &ControllerConfig) {
    let filter = env_filter(config);
    let result = if config.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
    };

    if let Err(e) = result {
        // Already installed, e.g. by a test harness
        tracing::debug!("Tracing subscriber already initialized: {}", e);
    }
}
