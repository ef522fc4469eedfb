//! Binary-search helpers treating a sorted `Vec<TimedRowEvent>` as a
//! sparse map keyed by [`TimeInPattern`].
//!
//! Grounded on `doc/kv.h` / `doc_util/event_search.h` in the original
//! implementation.

use super::events::RowEvent;
use super::timed_events::{TickT, TimeInPattern, TimedRowEvent};

pub type EventList = Vec<TimedRowEvent>;

/// Mutable-reference wrapper adding map-like operations to an [`EventList`].
pub struct Kv<'a> {
    events: &'a mut EventList,
}

impl<'a> Kv<'a> {
    pub fn new(events: &'a mut EventList) -> Self {
        Self { events }
    }

    /// Index of the first event whose time is `>= t`.
    pub fn lower_bound(&self, t: TimeInPattern) -> usize {
        self.events.partition_point(|ev| ev.time < t)
    }

    pub fn contains_time(&self, t: TimeInPattern) -> bool {
        let idx = self.lower_bound(t);
        self.events.get(idx).is_some_and(|ev| ev.time == t)
    }

    pub fn get(&self, t: TimeInPattern) -> Option<&RowEvent> {
        let idx = self.lower_bound(t);
        self.events
            .get(idx)
            .filter(|ev| ev.time == t)
            .map(|ev| &ev.v)
    }

    /// Insert or overwrite the event at `t`.
    pub fn set_time(&mut self, t: TimeInPattern, v: RowEvent) {
        let idx = self.lower_bound(t);
        if self.events.get(idx).is_some_and(|ev| ev.time == t) {
            self.events[idx].v = v;
        } else {
            self.events.insert(idx, TimedRowEvent::new(t, v));
        }
    }

    /// Return a mutable reference to the event at `t`, inserting an empty
    /// one first if none exists.
    pub fn get_or_insert(&mut self, t: TimeInPattern) -> &mut RowEvent {
        let idx = self.lower_bound(t);
        if !self.events.get(idx).is_some_and(|ev| ev.time == t) {
            self.events.insert(idx, TimedRowEvent::new(t, RowEvent::default()));
        }
        &mut self.events[idx].v
    }

    /// First index whose `anchor_beat == beat` and `tick_offset` places it
    /// at or after the start of that beat's row.
    pub fn beat_begin(&self, beat: num_rational::Ratio<i32>) -> usize {
        self.lower_bound(TimeInPattern::begin_of_beat_at(beat))
    }

    /// First index whose `anchor_beat >= beat` (the tick-exact equivalent
    /// with `tick_offset` pinned to the smallest possible value).
    pub fn tick_begin(&self, anchor_beat: num_rational::Ratio<i32>, offset: TickT) -> usize {
        self.lower_bound(TimeInPattern::new(anchor_beat, offset))
    }
}

/// Remove all events whose value is [`RowEvent::default`].
pub fn erase_empty(events: &mut EventList) {
    events.retain(|ev| !ev.v.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::events::Note;
    use num_rational::Ratio;

    fn at(n: i32) -> TimeInPattern {
        TimeInPattern::new(Ratio::new(n, 1), 0)
    }

    #[test]
    fn get_or_insert_then_get_round_trips() {
        let mut events = EventList::new();
        let mut kv = Kv::new(&mut events);
        kv.get_or_insert(at(2)).note = Some(Note(60));

        let kv = Kv::new(&mut events);
        assert_eq!(kv.get(at(2)).unwrap().note, Some(Note(60)));
        assert!(kv.get(at(1)).is_none());
    }

    #[test]
    fn set_time_overwrites_existing() {
        let mut events = EventList::new();
        let mut kv = Kv::new(&mut events);
        let mut ev = RowEvent::default();
        ev.note = Some(Note(1));
        kv.set_time(at(0), ev);
        let mut ev2 = RowEvent::default();
        ev2.note = Some(Note(2));
        kv.set_time(at(0), ev2);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].v.note, Some(Note(2)));
    }

    #[test]
    fn erase_empty_removes_only_default_events() {
        let mut events = vec![
            TimedRowEvent::new(at(0), RowEvent::default()),
            TimedRowEvent::new(at(1), {
                let mut e = RowEvent::default();
                e.note = Some(Note(5));
                e
            }),
        ];
        erase_empty(&mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time, at(1));
    }
}
