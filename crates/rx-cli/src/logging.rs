//! Logging setup for the CLI
//!
//! Priority: RUST_LOG env var > --debug flag > default "info".
//! Output goes to stderr so exported data on stdout stays clean.

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Initialise the tracing subscriber
pub fn init(debug_flag: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(DEFAULT_LOG_LEVEL)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "logging initialised");
}
