//! Process-wide structured logging for the SKU catalog service.

/// Tracing subscriber setup (filters, JSON layer).
pub mod tracing;

/// Initialize logging with the default `info` level.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init_with(tracing::DEFAULT_DIRECTIVES);
}
