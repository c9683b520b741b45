//! Structured logging setup for the binary.

use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor `--debug` is given.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Builds the log filter.
///
/// Priority: `RUST_LOG` env var > `--debug` flag > [`DEFAULT_LOG_LEVEL`].
pub fn filter(debug_flag: bool) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(DEFAULT_LOG_LEVEL)
    }
}

/// Initialises the global subscriber, writing to stderr so that stdout stays
/// free for calculation output.
pub fn init(debug_flag: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(debug_flag))
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "Logging initialised");
}
