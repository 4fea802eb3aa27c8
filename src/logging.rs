//! Logging setup for the RedBlue binaries.
//!
//! Logs go to stderr; stdout is reserved for the JSON-RPC stream.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber using `filter` as the directive.
///
/// An unparsable directive falls back to `info`. Calling this more than once
/// is harmless; later calls are ignored.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
