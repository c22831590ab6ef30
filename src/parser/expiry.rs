//! Expiry resolution for token responses.
//!
//! Servers report token lifetime in several shapes: a relative duration in
//! seconds, or an absolute epoch in seconds or milliseconds, under a handful
//! of field names depending on the API version. Everything is normalized to
//! one absolute millisecond timestamp with the safety margin subtracted.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::utils::constants::{DEFAULT_SAFETY_MARGIN_SECS, DEFAULT_TOKEN_TTL_SECS};

/// Relative "seconds until expiry" fields, checked in order.
pub const DURATION_FIELDS: [&str; 4] = ["expiresIn", "expireIn", "expires", "expireSeconds"];
/// Absolute expiry timestamp fields, checked in order.
pub const ABSOLUTE_FIELDS: [&str; 3] = ["expireTime", "expiresAt", "expirationTime"];

/// Durations at or above this are assumed to be in the wrong unit.
const MAX_DURATION_SECONDS: f64 = 1e8;
/// Absolute values above this are already milliseconds.
const MILLIS_THRESHOLD: f64 = 1e12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryResolver {
    safety_margin_ms: i64,
    default_ttl_ms: i64,
}

impl Default for ExpiryResolver {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_SAFETY_MARGIN_SECS),
            Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
        )
    }
}

impl ExpiryResolver {
    pub fn new(safety_margin: Duration, default_ttl: Duration) -> Self {
        Self {
            safety_margin_ms: saturating_millis(safety_margin),
            default_ttl_ms: saturating_millis(default_ttl),
        }
    }

    pub fn safety_margin_ms(&self) -> i64 {
        self.safety_margin_ms
    }

    /// Absolute expiry (ms) for the `data` section of a token response.
    ///
    /// Never fails: unusable fields are skipped and the default TTL applies
    /// when nothing matches.
    pub fn resolve(&self, data: &Value, now_ms: i64) -> i64 {
        for key in DURATION_FIELDS {
            match numeric_field(data, key) {
                Some(secs) if secs.is_finite() && secs > 0.0 && secs < MAX_DURATION_SECONDS => {
                    debug!(field = key, seconds = secs, "token expiry from duration field");
                    return now_ms.saturating_add((secs * 1000.0) as i64).saturating_sub(self.safety_margin_ms);
                }
                _ => continue,
            }
        }

        for key in ABSOLUTE_FIELDS {
            match numeric_field(data, key) {
                Some(value) if value.is_finite() && value != 0.0 => {
                    let normalized = if value > MILLIS_THRESHOLD { value } else { value * 1000.0 };
                    if normalized > now_ms as f64 {
                        debug!(field = key, expires_at_ms = normalized, "token expiry from absolute field");
                        return (normalized as i64).saturating_sub(self.safety_margin_ms);
                    }
                }
                _ => continue,
            }
        }

        debug!(default_ttl_ms = self.default_ttl_ms, "no usable expiry field, using default ttl");
        now_ms.saturating_add(self.default_ttl_ms).saturating_sub(self.safety_margin_ms)
    }
}

fn saturating_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Numbers are taken as-is, strings are read as a leading integer, anything else is skipped.
fn numeric_field(data: &Value, key: &str) -> Option<f64> {
    match data.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

/// Integer prefix of `s`: optional whitespace and sign, then decimal digits.
/// `"3600s"` reads as 3600, `"abc"` as nothing.
fn parse_leading_int(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: &str = &digits[..digits.bytes().take_while(u8::is_ascii_digit).count()];
    if digits.is_empty() {
        return None;
    }
    let value = digits
        .bytes()
        .fold(0f64, |acc, b| acc * 10.0 + f64::from(b - b'0'));
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const T: i64 = 1_760_000_000_000;
    const MARGIN: i64 = 60_000;

    #[test]
    fn oversized_default_ttl_saturates_instead_of_wrapping() {
        let resolver = ExpiryResolver::new(Duration::from_secs(60), Duration::from_secs(u64::MAX / 1000));
        let expires_at = resolver.resolve(&json!({}), T);
        assert!(expires_at > T, "fallback expiry {expires_at} is not after now");
        assert_eq!(expires_at, i64::MAX - MARGIN);
    }

    #[test]
    fn duration_seconds_are_converted_and_margin_applied() {
        let resolver = ExpiryResolver::default();
        assert_eq!(resolver.resolve(&json!({"expiresIn": 3600}), T), T + 3_600_000 - MARGIN);
        assert_eq!(resolver.resolve(&json!({"expireSeconds": "7200"}), T), T + 7_200_000 - MARGIN);
    }

    #[test]
    fn absolute_seconds_are_scaled_and_millis_are_not() {
        let resolver = ExpiryResolver::default();
        let in_two_hours_secs = T / 1000 + 7200;
        let in_two_hours_ms = T + 7_200_000;

        assert_eq!(
            resolver.resolve(&json!({"expireTime": in_two_hours_secs}), T),
            in_two_hours_secs * 1000 - MARGIN
        );
        assert_eq!(
            resolver.resolve(&json!({"expireTime": in_two_hours_ms}), T),
            in_two_hours_ms - MARGIN
        );
        assert_eq!(
            resolver.resolve(&json!({"expirationTime": in_two_hours_ms.to_string()}), T),
            in_two_hours_ms - MARGIN
        );
    }

    #[test]
    fn missing_or_unusable_fields_fall_back_to_default_ttl() {
        let resolver = ExpiryResolver::default();
        let fallback = T + 50 * 60 * 1000 - MARGIN;

        assert_eq!(resolver.resolve(&json!({}), T), fallback);
        assert_eq!(resolver.resolve(&Value::Null, T), fallback);
        assert_eq!(
            resolver.resolve(
                &json!({
                    "expiresIn": "soon",
                    "expireIn": -5,
                    "expires": 0,
                    "expireSeconds": true,
                    "expireTime": null,
                    "expiresAt": (T / 1000) - 10,
                }),
                T
            ),
            fallback
        );
    }

    #[test]
    fn implausible_durations_are_rejected() {
        let resolver = ExpiryResolver::default();
        // milliseconds reported as a duration
        let resolved = resolver.resolve(&json!({"expiresIn": 3_600_000_000u64}), T);
        assert_eq!(resolved, T + 50 * 60 * 1000 - MARGIN);
    }

    #[test]
    fn first_usable_field_wins() {
        let resolver = ExpiryResolver::default();
        let data = json!({"expires": 100, "expiresIn": 3600, "expireTime": T / 1000 + 10});
        assert_eq!(resolver.resolve(&data, T), T + 3_600_000 - MARGIN);

        let data = json!({"expiresIn": 0, "expireIn": 120});
        assert_eq!(resolver.resolve(&data, T), T + 120_000 - MARGIN);

        // duration fields always outrank absolute ones
        let data = json!({"expireTime": T / 1000 + 10, "expireSeconds": 30});
        assert_eq!(resolver.resolve(&data, T), T + 30_000 - MARGIN);

        // past absolute values are skipped, not fatal
        let data = json!({"expireTime": T / 1000 - 10, "expiresAt": T + 5_000});
        assert_eq!(resolver.resolve(&data, T), T + 5_000 - MARGIN);
    }

    #[test]
    fn string_values_read_leading_integer() {
        assert_eq!(parse_leading_int("3600"), Some(3600.0));
        assert_eq!(parse_leading_int("  42s"), Some(42.0));
        assert_eq!(parse_leading_int("-7"), Some(-7.0));
        assert_eq!(parse_leading_int("12.9"), Some(12.0));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("+"), None);
    }

    #[test]
    fn custom_margin_and_ttl() {
        let resolver = ExpiryResolver::new(Duration::from_secs(10), Duration::from_secs(600));
        assert_eq!(resolver.resolve(&json!({"expiresIn": 100}), T), T + 100_000 - 10_000);
        assert_eq!(resolver.resolve(&json!({}), T), T + 600_000 - 10_000);
    }
}
