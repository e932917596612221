//! Tracing subscriber setup

use std::env;
use std::io;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "JSVALUE_LOG";

/// Install the global fmt subscriber writing to stderr
///
/// `JSVALUE_LOG` uses `RUST_LOG` syntax. Without it the level is `warn`, or `debug`
/// with `--verbose`.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = match env::var(LOG_ENV) {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) => EnvFilter::new(fallback),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
