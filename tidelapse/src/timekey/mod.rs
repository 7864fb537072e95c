//! Canonical time keys for frame indexing.
//!
//! A [`TimeKey`] encodes a UTC calendar instant at minute resolution as a
//! fixed-width `YYYYMMDDHHMM` string. The encoding is chosen so that
//! lexicographic order equals chronological order, which lets keys double as
//! cache-map keys, URL path segments, and sort keys without re-parsing.
//!
//! Keys are constructed either from a [`chrono::DateTime<Utc>`] via
//! [`TimeKey::encode`] or from an already-encoded string via
//! [`TimeKey::from_key`]. The latter is an identity passthrough, so callers
//! can mix raw instants and pre-encoded strings uniformly.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use thiserror::Error;

/// Width of the encoded key: `YYYYMMDDHHMM`.
pub const TIME_KEY_LEN: usize = 12;

/// Errors raised when decoding a time key from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeKeyError {
    /// The input is shorter than the fixed key width.
    #[error("time key too short: expected {TIME_KEY_LEN} characters, got {0}")]
    TooShort(usize),

    /// The key prefix contains a non-digit character.
    #[error("time key contains a non-digit character: {0:?}")]
    NonDigit(String),

    /// The digit fields do not form a valid UTC calendar instant.
    #[error("time key does not encode a valid UTC instant: {0:?}")]
    InvalidInstant(String),
}

/// A UTC calendar instant encoded as a sortable `YYYYMMDDHHMM` string.
///
/// Invariant: for any two keys, `a < b` (string order) iff the instant of
/// `a` precedes the instant of `b`. Construction always validates, so the
/// decoded instant is available infallibly afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeKey {
    key: String,
    instant: DateTime<Utc>,
}

impl TimeKey {
    /// Encodes a UTC instant, truncated to minute resolution.
    ///
    /// Total function: every representable `DateTime<Utc>` has a key.
    pub fn encode(instant: DateTime<Utc>) -> Self {
        let truncated = instant
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(instant);
        let key = format!(
            "{:04}{:02}{:02}{:02}{:02}",
            truncated.year(),
            truncated.month(),
            truncated.day(),
            truncated.hour(),
            truncated.minute()
        );
        Self {
            key,
            instant: truncated,
        }
    }

    /// Accepts an already-encoded key string.
    ///
    /// Trailing characters beyond the fixed width are ignored, matching the
    /// tolerant behavior expected from URL path segments. Rejects inputs
    /// shorter than [`TIME_KEY_LEN`] or with non-digit prefix fields.
    pub fn from_key(key: &str) -> Result<Self, TimeKeyError> {
        let bytes = key.as_bytes();
        if bytes.len() < TIME_KEY_LEN {
            return Err(TimeKeyError::TooShort(bytes.len()));
        }
        // Validate on bytes before slicing the str: a multi-byte character
        // straddling the cut would otherwise make the slice panic.
        if !bytes[..TIME_KEY_LEN].iter().all(|b| b.is_ascii_digit()) {
            return Err(TimeKeyError::NonDigit(key.to_string()));
        }
        let digits = &key[..TIME_KEY_LEN];
        let instant = decode_fields(digits)?;
        Ok(Self {
            key: digits.to_string(),
            instant,
        })
    }

    /// The decoded UTC instant. Inverse of [`TimeKey::encode`].
    pub fn to_instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Renders a human-readable label for UI display, in UTC.
    ///
    /// Display-only: scheduling and caching never depend on this rendering.
    pub fn display_label(&self) -> String {
        self.instant.format("%Y-%m-%d %H:%M UTC").to_string()
    }

    /// The encoded key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Display for TimeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for TimeKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// Decodes the five fixed-width digit fields into a UTC instant.
fn decode_fields(digits: &str) -> Result<DateTime<Utc>, TimeKeyError> {
    // Slicing is safe: the caller has verified 12 ASCII digits.
    let field = |range: std::ops::Range<usize>| -> u32 {
        digits[range].parse().unwrap_or(0)
    };
    let year: i32 = digits[0..4].parse().unwrap_or(0);
    Utc.with_ymd_and_hms(
        year,
        field(4..6),
        field(6..8),
        field(8..10),
        field(10..12),
        0,
    )
    .single()
    .ok_or_else(|| TimeKeyError::InvalidInstant(digits.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_encode_zero_pads_fields() {
        let key = TimeKey::encode(utc(2025, 1, 2, 3, 4));
        assert_eq!(key.as_str(), "202501020304");
    }

    #[test]
    fn test_encode_truncates_to_minute() {
        let with_seconds = Utc.with_ymd_and_hms(2025, 10, 21, 3, 0, 42).unwrap();
        let key = TimeKey::encode(with_seconds);
        assert_eq!(key.as_str(), "202510210300");
        assert_eq!(key.to_instant().second(), 0);
    }

    #[test]
    fn test_from_key_is_identity_passthrough() {
        let key = TimeKey::from_key("202510210300").unwrap();
        assert_eq!(key.as_str(), "202510210300");
        assert_eq!(key.to_instant(), utc(2025, 10, 21, 3, 0));
    }

    #[test]
    fn test_from_key_ignores_trailing_characters() {
        let key = TimeKey::from_key("20251021030000").unwrap();
        assert_eq!(key.as_str(), "202510210300");
    }

    #[test]
    fn test_from_key_rejects_short_input() {
        let err = TimeKey::from_key("20251021").unwrap_err();
        assert_eq!(err, TimeKeyError::TooShort(8));
    }

    #[test]
    fn test_from_key_rejects_non_digits() {
        let err = TimeKey::from_key("2025-10-2103").unwrap_err();
        assert!(matches!(err, TimeKeyError::NonDigit(_)));
    }

    #[test]
    fn test_from_key_rejects_multibyte_character_at_boundary() {
        // 11 digits followed by a two-byte character: the fixed-width cut
        // lands inside it. Must reject cleanly, never panic on the slice.
        let err = TimeKey::from_key("20251021030\u{e9}").unwrap_err();
        assert!(matches!(err, TimeKeyError::NonDigit(_)));

        let err = TimeKey::from_key("20251021030\u{e9}0000").unwrap_err();
        assert!(matches!(err, TimeKeyError::NonDigit(_)));
    }

    #[test]
    fn test_from_key_rejects_invalid_instant() {
        // Month 13 does not exist.
        let err = TimeKey::from_key("202513010000").unwrap_err();
        assert!(matches!(err, TimeKeyError::InvalidInstant(_)));
    }

    #[test]
    fn test_round_trip_encode_from_key() {
        let original = TimeKey::encode(utc(2025, 10, 21, 6, 30));
        let reparsed = TimeKey::from_key(original.as_str()).unwrap();
        assert_eq!(original, reparsed);
    }

    #[test]
    fn test_string_order_matches_chronological_order() {
        let earlier = TimeKey::encode(utc(2025, 9, 30, 23, 59));
        let later = TimeKey::encode(utc(2025, 10, 1, 0, 0));
        assert!(earlier < later);
        assert!(earlier.to_instant() < later.to_instant());
    }

    #[test]
    fn test_display_label_renders_utc() {
        let key = TimeKey::encode(utc(2025, 10, 21, 3, 0));
        assert_eq!(key.display_label(), "2025-10-21 03:00 UTC");
    }

    proptest! {
        #[test]
        fn prop_round_trip_at_minute_resolution(
            secs in 0i64..4_102_444_800, // 1970..2100
        ) {
            let instant = DateTime::<Utc>::from_timestamp(secs - secs % 60, 0).unwrap();
            let key = TimeKey::encode(instant);
            prop_assert_eq!(key.to_instant(), instant);
            let reparsed = TimeKey::from_key(key.as_str()).unwrap();
            prop_assert_eq!(reparsed.to_instant(), instant);
        }

        #[test]
        fn prop_lexicographic_equals_chronological(
            a in 0i64..4_102_444_800,
            b in 0i64..4_102_444_800,
        ) {
            let ta = DateTime::<Utc>::from_timestamp(a - a % 60, 0).unwrap();
            let tb = DateTime::<Utc>::from_timestamp(b - b % 60, 0).unwrap();
            let ka = TimeKey::encode(ta);
            let kb = TimeKey::encode(tb);
            prop_assert_eq!(ka.cmp(&kb), ta.cmp(&tb));
        }
    }
}
