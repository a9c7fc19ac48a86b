//! Logging initialization.
//!
//! The default filter comes from the loaded configuration; `RUST_LOG`
//! always wins when set, so operators can override the config without
//! touching it.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system with a config-supplied default filter.
///
/// `filter` is either a bare level ("debug"), which is scoped to this
/// crate, or a full directive string ("codeshell=debug,axum=warn"), used
/// as-is.
///
/// # Panics
///
/// Panics if called more than once, or if another tracing subscriber
/// has already been set.
pub fn init(filter: &str) {
    tracing_subscriber::registry()
        .with(build_filter(filter))
        .with(tracing_subscriber::fmt::layer().compact())
        .init();
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init(filter: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(build_filter(filter))
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}

fn build_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(crate_directive(default)))
}

/// Scope a bare level to this crate; pass full directives through.
fn crate_directive(filter: &str) -> String {
    if filter.contains('=') || filter.contains(',') {
        filter.to_string()
    } else {
        format!("codeshell={}", filter)
    }
}
