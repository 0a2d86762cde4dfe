//! Tracing subscriber setup.
//!
//! Levels used by the methods:
//! - ERROR: request could not be built
//! - WARN: identity could not be stored, stale responses
//! - INFO: invalid frames, relay delay start
//! - DEBUG: exchange state changes, escaped identities
//! - TRACE: raw frame bytes

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `level` overrides `RUST_LOG`; without either the filter is `info`.
pub fn init(level: Option<&str>) {
    let filter = match level {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
