//! Structured logging initialization
//!
//! Logs always go to stderr: stdout of the pg-env binary is evaluated by the
//! calling shell and must carry nothing but the generated snippet.

use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter applied when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "warn";

/// Guard that keeps the tracing subscriber active.
/// Drop this at the end of main to flush logs.
pub struct LogGuard;

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize structured logging for a component.
///
/// Returns a guard that should be held for the lifetime of the program.
/// Calling this twice in one process is harmless; the second call keeps the
/// subscriber installed by the first.
///
/// # Example
/// ```ignore
/// let _guard = init_logging("pg-env");
/// debug!("Resolving installation directory...");
/// ```
pub fn init_logging(component: &str) -> LogGuard {
    let format = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);

    let installed = tracing_subscriber::registry()
        .with(env_filter())
        .with(format)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(component, "Logging initialized");
    }

    LogGuard
}
