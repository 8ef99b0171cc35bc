//! Tracing/logging initialization.
//!
//! Logs are JSON lines with timestamps. `RUST_LOG` overrides the default
//! directives (e.g. `RUST_LOG=skucatalog_infra=debug,info`).

use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVES: &str = "info";

/// The filter in effect: `RUST_LOG` when set and valid, else `default_directives`.
pub fn filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Install the JSON subscriber.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_with(default_directives: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(default_directives))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_current_span(true)
        .with_target(true)
        .try_init();
}
