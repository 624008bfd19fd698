// Wait extraction - how long a tool result says to hold off
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::MAX_SLEEP_SECONDS;

/// Seconds until the soonest pending deadline named in `result`: a 429
/// `retryAfter`, a cooldown expiration, or a route arrival. Candidates that are
/// non-positive or unparsable are ignored; the result never exceeds
/// `MAX_SLEEP_SECONDS`.
pub fn extract_wait_duration(result: &Value, now: DateTime<Utc>) -> Option<f64> {
    let mut candidates = Vec::new();

    if let Some(error) = result.get("error") {
        let is_rate_limited = error.get("code").and_then(Value::as_i64) == Some(429);
        if is_rate_limited {
            if let Some(retry) = error.pointer("/data/retryAfter").and_then(Value::as_f64) {
                candidates.push(retry);
            }
        }
    }

    if let Some(data) = result.get("data") {
        let deadlines = [
            data.pointer("/cooldown/expiration"),
            data.pointer("/nav/route/arrival"),
        ];
        for deadline in deadlines.into_iter().flatten() {
            if let Some(seconds) = deadline.as_str().and_then(|ts| seconds_until(ts, now)) {
                candidates.push(seconds);
            }
        }
    }

    candidates
        .into_iter()
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
        .min_by(|a, b| a.total_cmp(b))
        .map(|seconds| seconds.min(MAX_SLEEP_SECONDS))
}

fn seconds_until(timestamp: &str, now: DateTime<Utc>) -> Option<f64> {
    let at = DateTime::parse_from_rfc3339(timestamp).ok()?.with_timezone(&Utc);
    Some((at - now).num_milliseconds() as f64 / 1000.0)
}
