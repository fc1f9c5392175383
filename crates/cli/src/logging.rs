use std::io;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber.
///
/// Priority for the filter:
/// 1. `RUST_LOG` if set (allows per-module filters like `symcollect_core=debug`)
/// 2. `level`, from `--log-level` / `--verbose`
///
/// Stdout stays reserved for the summary or JSON report. Calling this twice is harmless.
pub fn init_logging(level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Parse a `--log-level` value, case-insensitively.
pub fn parse_level(value: &str) -> Result<Level, String> {
    value.parse::<Level>().map_err(|_| {
        format!("invalid log level '{value}' (expected error, warn, info, debug or trace)")
    })
}
