use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Current UNIX time in milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// RFC 3339 rendering of a millisecond timestamp, for logs and responses.
pub fn ms_to_rfc3339(ts_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts_ms.to_string())
}
