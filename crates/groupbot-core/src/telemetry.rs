//! Tracing bootstrap.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global tracing subscriber. Filter defaults to `info` and can
/// be overridden through `RUST_LOG`. Calling twice is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
