// Global logging setup for clean output control
use tracing_subscriber::EnvFilter;

/// Maps a CLI log level (DEBUG, INFO, WARNING, ERROR, ...) to a filter directive.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" | "fatal" => "error",
        "off" | "silent" => "off",
        _ => "info",
    }
}

/// `RUST_LOG` wins when present; otherwise the CLI level applies.
pub fn log_filter(level: &str) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives)
            .unwrap_or_else(|_| EnvFilter::new(level_directive(level))),
        _ => EnvFilter::new(level_directive(level)),
    }
}

/// Installs the fmt subscriber. Safe to call more than once.
pub fn init_logging(level: &str) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(log_filter(level))
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!("📢 Log level: {}", level_directive(level));
    }
}
