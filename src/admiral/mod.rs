// Admiral module - the polling control loops that drive the agent
pub mod advisory_loop;
pub mod tool_loop;
pub mod wait;

pub use advisory_loop::*;
pub use tool_loop::*;
pub use wait::*;

use std::path::Path;
use std::time::Duration;

/// Whole-file advisory text. A missing or unreadable file reads as `None`.
pub fn read_advisory(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!("📄 Could not read advisory {}: {}", path.display(), e);
            }
            None
        }
    }
}

/// Upper bound for any single sleep or wait deadline.
pub const MAX_SLEEP_SECONDS: f64 = 86_400.0;

/// Converts seconds to a sleepable duration, clamped to `0..=MAX_SLEEP_SECONDS`.
pub(crate) fn seconds(value: f64) -> Duration {
    if !(value > 0.0) {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value.min(MAX_SLEEP_SECONDS)).unwrap_or(Duration::ZERO)
}
