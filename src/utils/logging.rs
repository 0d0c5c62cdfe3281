//! Logging initialization for the peer's system module layer
//!
//! - Respects the RUST_LOG environment variable, which always wins
//! - Falls back to the `[logging]` filter from config, then to `info`
//! - Human-readable output by default, JSON behind the `json-logging` feature
//!
//! # Usage
//! ```rust,no_run
//! use peer_syscc::utils::init_logging;
//!
//! init_logging(None).ok(); // RUST_LOG or "info"
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter used when neither RUST_LOG nor config provide one
pub const DEFAULT_FILTER: &str = "info";

/// Pick the effective filter directive
///
/// RUST_LOG takes precedence over the configured filter.
pub fn resolve_filter(rust_log: Option<&str>, configured: Option<&str>) -> String {
    rust_log
        .filter(|s| !s.trim().is_empty())
        .or(configured)
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

fn env_filter(configured: Option<&str>) -> EnvFilter {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = resolve_filter(rust_log.as_deref(), configured);
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize human-readable logging
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(filter: Option<&str>) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(std::env::var("NO_COLOR").is_err()),
        )
        .with(env_filter(filter))
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging already initialized: {}", e))
}

/// Initialize JSON logging for log aggregation
#[cfg(feature = "json-logging")]
pub fn init_json_logging(filter: Option<&str>) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(env_filter(filter))
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging already initialized: {}", e))
}

/// Initialize logging from the `[logging]` config section
pub fn init_logging_from_config(config: Option<&LoggingConfig>) -> anyhow::Result<()> {
    let filter = config.and_then(|c| c.filter.as_deref());

    if config.map(|c| c.json_format).unwrap_or(false) {
        #[cfg(feature = "json-logging")]
        {
            return init_json_logging(filter);
        }
    }

    init_logging(filter)
}
