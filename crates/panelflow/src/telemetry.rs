//! Tracing subscriber setup.
//!
//! Panelflow only emits `tracing` events; installing a subscriber is left to
//! the embedding program. These helpers cover the common cases. `RUST_LOG`
//! wins over the filter passed in, and only the first call in a process
//! takes effect.

use crate::config::FlowConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install a human-readable subscriber
///
/// Returns `false` when a global subscriber was already set.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(fmt::layer())
        .try_init()
        .is_ok()
}

/// Install a newline-delimited JSON subscriber
///
/// Returns `false` when a global subscriber was already set.
pub fn init_json_tracing(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(fmt::layer().json())
        .try_init()
        .is_ok()
}

/// Install a human-readable subscriber using the configured filter
pub fn init_from_config(config: &FlowConfig) -> bool {
    init_tracing(&config.log_filter)
}
