//! Logging setup using tracing.
//!
//! Logs go to stderr so the CSV written to stdout stays clean.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set. An invalid `level`
/// falls back to `warn`.
pub fn init_logging(level: &str) {
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|e| {
            eprintln!("Invalid log level '{level}': {e}");
            EnvFilter::new("warn")
        });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed (tests).
    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .try_init();

    tracing::debug!(level = %level, "Logging initialized");
}
