//! Tracing subscriber setup for binaries and tests embedding the store.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a compact fmt subscriber.
/// - Respects `RUST_LOG` if set, otherwise `info`
/// - Does nothing if a global subscriber is already installed
pub fn init_logging_default() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init();
}
