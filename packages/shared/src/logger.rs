//! Logging setup for the Utage binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// Both the server library crate and the binary log at `default_log_level`;
/// everything else (axum, hyper, tower-http) stays at `info` or above.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "info,utage_server={level},{binary}={level},tower_http={level}",
        level = default_log_level,
        binary = binary_name.replace('-', "_"),
    )
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The level can be overridden with the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use utage_shared::logger::setup_logger;
///
/// setup_logger("utage-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
