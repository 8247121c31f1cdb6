//! Logging setup for binaries

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize console logging with env-filter overrides, defaulting the
/// crate to debug level.
pub fn init() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("meetscribe=debug".parse().expect("valid directive")),
        )
        .init();
}
