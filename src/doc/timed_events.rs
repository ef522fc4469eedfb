//! Timestamps of rows within a pattern.
//!
//! Everything here operates using half-open `[inclusive, exclusive)`
//! ranges; `begin_of_beat` makes it easy to find all notes whose
//! `anchor_beat` lies in `[a, b)`.

use num_rational::Ratio;
use serde::{Deserialize, Serialize};

use super::events::RowEvent;

pub type FractionInt = i32;

/// A rational number of beats. Exact, so looped patterns and odd tuplets
/// never accumulate rounding error.
pub type BeatFraction = Ratio<FractionInt>;

/// Round a beat fraction to the nearest tick, rounding half away from zero.
///
/// Mirrors `round_to_int` in the original C++ (`doc/timed_events.h`): add
/// half a unit in the direction of the sign, then truncate.
pub fn round_to_int(v: BeatFraction) -> i32 {
    let sign = v.numer().signum();
    let shifted = v + Ratio::new(sign, 2);
    shifted.to_integer()
}

/// Events can have negative offsets and play before their anchor beat, or
/// even before the owning pattern starts. This is a feature(tm) (spec.md
/// §9's "tick offsets reshuffling order" design note) — we do not attempt
/// to make the sort order match the playback order.
pub type TickT = i32;

/// A timestamp of a row within a pattern.
///
/// `anchor_beat` controls how many beats into the pattern the note plays;
/// it should be non-negative. `tick_offset` nudges playback earlier or
/// later by a fixed number of ticks, independent of tempo.
///
/// All positions are sorted by `(anchor_beat, tick_offset)`. This makes no
/// attempt to prevent `tick_offset` from causing the sort order to differ
/// from the playback order: that is allowed, and simply misbehaves during
/// playback if abused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeInPattern {
    pub anchor_beat: BeatFraction,
    pub tick_offset: TickT,
}

impl TimeInPattern {
    pub fn new(anchor_beat: BeatFraction, tick_offset: TickT) -> Self {
        Self {
            anchor_beat,
            tick_offset,
        }
    }

    /// A timestamp lying before any notes anchored to `self`'s beat.
    pub fn begin_of_beat(self) -> Self {
        Self::begin_of_beat_at(self.anchor_beat)
    }

    /// A timestamp lying before any notes anchored to `anchor_beat`.
    pub fn begin_of_beat_at(anchor_beat: BeatFraction) -> Self {
        Self {
            anchor_beat,
            tick_offset: TickT::MIN,
        }
    }
}

/// A [`RowEvent`] anchored at a [`TimeInPattern`] within a pattern.
///
/// Ordering (and therefore binary search) only considers `time`, matching
/// the original's `COMPARE_ONLY(TimedRowEvent, (time))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedRowEvent {
    pub time: TimeInPattern,
    pub v: RowEvent,
}

impl TimedRowEvent {
    pub fn new(time: TimeInPattern, v: RowEvent) -> Self {
        Self { time, v }
    }
}

impl PartialOrd for TimedRowEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for TimedRowEvent {}

impl Ord for TimedRowEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time.cmp(&other.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(n: i32, d: i32) -> BeatFraction {
        Ratio::new(n, d)
    }

    #[test]
    fn round_to_int_rounds_half_away_from_zero() {
        assert_eq!(round_to_int(frac(1, 2)), 1);
        assert_eq!(round_to_int(frac(-1, 2)), -1);
        assert_eq!(round_to_int(frac(3, 2)), 2);
        assert_eq!(round_to_int(frac(5, 4)), 1);
        assert_eq!(round_to_int(frac(0, 1)), 0);
    }

    #[test]
    fn ordering_is_anchor_then_offset() {
        let a = TimeInPattern::new(frac(0, 1), 5);
        let b = TimeInPattern::new(frac(1, 1), -100);
        assert!(a < b);

        let c = TimeInPattern::new(frac(0, 1), -5);
        assert!(c < a);
    }

    #[test]
    fn timed_row_event_ignores_value_when_ordering() {
        use crate::doc::events::{Note, RowEvent};

        let t = TimeInPattern::new(frac(0, 1), 0);
        let a = TimedRowEvent::new(t, RowEvent::default());
        let mut ev = RowEvent::default();
        ev.note = Some(Note(10));
        let b = TimedRowEvent::new(t, ev);
        assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
    }
}
