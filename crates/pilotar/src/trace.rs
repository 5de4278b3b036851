//! Tracing bootstrap for harnesses and examples.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber.
///
/// Filter comes from `RUST_LOG`, defaulting to `info` so scenario
/// narration is visible out of the box. Safe to call more than once; only
/// the first call installs a subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
