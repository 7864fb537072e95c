//! Frame sequence construction on a fixed cadence.
//!
//! A playback session animates a window of model timesteps ending at "now",
//! snapped to the model's publication cadence (every N hours within the UTC
//! day). This module builds that window as an ordered [`FrameSequence`] of
//! [`TimeKey`]s and locates the best frame to start playback from.

use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};

use crate::timekey::TimeKey;

/// An ordered, deduplicated, ascending sequence of frame keys.
///
/// Built once per session load and immutable until the next load. May be
/// empty; every consumer treats the empty sequence as a valid no-op state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSequence {
    keys: Vec<TimeKey>,
}

impl FrameSequence {
    /// Builds a sequence from arbitrary keys, sorting ascending and removing
    /// duplicates.
    pub fn new(mut keys: Vec<TimeKey>) -> Self {
        keys.sort();
        keys.dedup();
        Self { keys }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when the sequence holds no frames.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The ordered keys.
    pub fn keys(&self) -> &[TimeKey] {
        &self.keys
    }

    /// The key at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&TimeKey> {
        self.keys.get(index)
    }
}

impl From<Vec<TimeKey>> for FrameSequence {
    fn from(keys: Vec<TimeKey>) -> Self {
        Self::new(keys)
    }
}

/// Rounds `instant` up to the next cadence boundary within its UTC day.
///
/// Boundaries are the whole hours `0, cadence, 2*cadence, ...` below 24.
/// They are scanned in ascending order with an `hour <= boundary` test, so
/// an instant already on a boundary hour snaps to that boundary (minutes and
/// seconds are cleared). Past the last boundary of the day, the result rolls
/// into the next UTC day at 00:00.
pub fn snap_to_cadence(instant: DateTime<Utc>, cadence_hours: u32) -> DateTime<Utc> {
    let cadence = cadence_hours.max(1);
    let day_start = instant.date_naive().and_time(NaiveTime::MIN).and_utc();
    let hour = instant.hour();
    let mut boundary = 0u32;
    while boundary < 24 {
        if hour <= boundary {
            return day_start + Duration::hours(i64::from(boundary));
        }
        boundary += cadence;
    }
    day_start + Duration::hours(24)
}

/// Builds `frame_count` keys ending at `snap_to_cadence(anchor)`, stepping
/// backward by `cadence_hours` per frame, returned in ascending order.
///
/// Produces exactly `frame_count` unique keys for `frame_count >= 1`;
/// `frame_count == 0` yields an empty sequence.
pub fn build_sequence(
    frame_count: usize,
    cadence_hours: u32,
    anchor: DateTime<Utc>,
) -> FrameSequence {
    let last = snap_to_cadence(anchor, cadence_hours);
    let step = Duration::hours(i64::from(cadence_hours.max(1)));
    let mut keys = Vec::with_capacity(frame_count);
    for offset in (0..frame_count as i64).rev() {
        keys.push(TimeKey::encode(last - step * offset as i32));
    }
    FrameSequence::new(keys)
}

/// Returns the highest index whose key's instant is `<= now`, scanning from
/// the end of the sequence.
///
/// Returns 0 when the sequence is empty or every frame lies in the future
/// (possible when the series was supplied externally with future
/// timestamps).
pub fn best_start_index(sequence: &FrameSequence, now: DateTime<Utc>) -> usize {
    sequence
        .keys()
        .iter()
        .rposition(|key| key.to_instant() <= now)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_snap_rounds_up_between_boundaries() {
        // 04:10 with a 3-hour cadence lands on 06:00.
        let snapped = snap_to_cadence(utc(2025, 10, 21, 4, 10), 3);
        assert_eq!(snapped, utc(2025, 10, 21, 6, 0));
    }

    #[test]
    fn test_snap_on_boundary_hour_stays() {
        // Boundary hours snap to themselves, minutes cleared.
        assert_eq!(
            snap_to_cadence(utc(2025, 10, 21, 3, 0), 3),
            utc(2025, 10, 21, 3, 0)
        );
        assert_eq!(
            snap_to_cadence(utc(2025, 10, 21, 3, 45), 3),
            utc(2025, 10, 21, 3, 0)
        );
    }

    #[test]
    fn test_snap_rolls_into_next_day() {
        let snapped = snap_to_cadence(utc(2025, 10, 21, 23, 30), 3);
        assert_eq!(snapped, utc(2025, 10, 22, 0, 0));
    }

    #[test]
    fn test_snap_midnight_stays() {
        let snapped = snap_to_cadence(utc(2025, 10, 21, 0, 0), 3);
        assert_eq!(snapped, utc(2025, 10, 21, 0, 0));
    }

    #[test]
    fn test_snap_cadence_not_dividing_day() {
        // Cadence 5: boundaries 0, 5, 10, 15, 20; hour 22 rolls over.
        assert_eq!(
            snap_to_cadence(utc(2025, 10, 21, 22, 0), 5),
            utc(2025, 10, 22, 0, 0)
        );
        assert_eq!(
            snap_to_cadence(utc(2025, 10, 21, 7, 0), 5),
            utc(2025, 10, 21, 10, 0)
        );
    }

    #[test]
    fn test_build_sequence_eight_frame_window() {
        let seq = build_sequence(8, 3, utc(2025, 10, 21, 4, 10));
        assert_eq!(seq.len(), 8);
        let keys: Vec<&str> = seq.keys().iter().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "202510200900",
                "202510201200",
                "202510201500",
                "202510201800",
                "202510202100",
                "202510210000",
                "202510210300",
                "202510210600",
            ]
        );
    }

    #[test]
    fn test_build_sequence_zero_frames() {
        let seq = build_sequence(0, 3, utc(2025, 10, 21, 4, 10));
        assert!(seq.is_empty());
    }

    #[test]
    fn test_sequence_new_sorts_and_dedups() {
        let seq = FrameSequence::new(vec![
            TimeKey::encode(utc(2025, 10, 21, 6, 0)),
            TimeKey::encode(utc(2025, 10, 21, 0, 0)),
            TimeKey::encode(utc(2025, 10, 21, 6, 0)),
        ]);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.keys()[0].as_str(), "202510210000");
        assert_eq!(seq.keys()[1].as_str(), "202510210600");
    }

    #[test]
    fn test_best_start_index_picks_latest_past_frame() {
        let seq = FrameSequence::new(vec![
            TimeKey::from_key("202510210000").unwrap(),
            TimeKey::from_key("202510210300").unwrap(),
            TimeKey::from_key("202510210600").unwrap(),
        ]);
        let now = utc(2025, 10, 21, 4, 10);
        assert_eq!(best_start_index(&seq, now), 1);
    }

    #[test]
    fn test_best_start_index_empty_sequence() {
        assert_eq!(best_start_index(&FrameSequence::default(), Utc::now()), 0);
    }

    #[test]
    fn test_best_start_index_all_future() {
        let seq = FrameSequence::new(vec![
            TimeKey::from_key("209901010000").unwrap(),
            TimeKey::from_key("209901020000").unwrap(),
        ]);
        assert_eq!(best_start_index(&seq, utc(2025, 1, 1, 0, 0)), 0);
    }

    proptest! {
        #[test]
        fn prop_snap_is_idempotent(
            secs in 0i64..4_102_444_800,
            cadence in 1u32..12,
        ) {
            let instant = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
            let once = snap_to_cadence(instant, cadence);
            prop_assert_eq!(snap_to_cadence(once, cadence), once);
        }

        #[test]
        fn prop_build_sequence_count_and_order(
            secs in 0i64..4_102_444_800,
            cadence in 1u32..12,
            count in 1usize..48,
        ) {
            let anchor = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
            let seq = build_sequence(count, cadence, anchor);
            prop_assert_eq!(seq.len(), count);
            for pair in seq.keys().windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            let last = seq.keys().last().unwrap();
            prop_assert_eq!(last.to_instant(), snap_to_cadence(anchor, cadence));
        }
    }
}
