//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Initializes logging with the given filter directive (e.g. `info`,
/// `oxbow_runtime=debug`).
///
/// An invalid directive falls back to `info`. Repeated calls are no-ops so
/// tests can call this freely; the first subscriber wins.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
