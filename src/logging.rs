//! Tracing subscriber setup.

use std::env;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the `EnvFilter` directives.
pub const LOG_ENV: &str = "ACTIONABLES_LOG";

/// Environment variable selecting `compact` (default) or `json` output.
pub const LOG_FORMAT_ENV: &str = "ACTIONABLES_LOG_FORMAT";

/// Install the global subscriber. Logs go to stderr so `resolve` output on
/// stdout stays machine-readable.
///
/// Calling this twice is harmless: the second install is ignored.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let format = env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    let _ = match format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
            .try_init(),
        _ => registry.with(fmt::layer().compact().with_writer(std::io::stderr)).try_init(),
    };
}
