//! Tracing subscriber initialization.

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Human-readable log output, filtered via `RUST_LOG`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .try_init();
}

/// JSON log output for log-shipping environments, filtered via `RUST_LOG`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init_json() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
