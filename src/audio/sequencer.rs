//! The sequencer (C4): walks the timeline tick by tick and hands each
//! channel driver the `RowEvent`s due to fire *this* tick.
//!
//! Grounded on `doc/sequence.h` and the tick-driving loop in
//! `audio/synth/nes_2a03_driver.cpp` in the original implementation.
//!
//! Unlike the original's cached per-channel cursor (which holds a borrowed
//! iterator across ticks), this port recomputes the active
//! [`PatternRef`] for each channel every tick by rescanning from the grid
//! cell start. That trades a few extra comparisons per tick for not having
//! to thread a self-referential borrow of `Document` through the command
//! queue — acceptable since `TimelineCellIter::next` is O(1) amortized and
//! real songs have a handful of blocks per cell, not thousands.

use crate::doc::{round_to_int, Document, RowEvent, TickT, TimelineCellIter};
use crate::timing::{grid_cell_for_tick, SequencerTick, SequencerTime};

/// Find the events due to fire at `time` within one channel's timeline,
/// relative to the grid cell `time.grid` is in.
fn events_at(doc: &Document, chip: usize, channel: usize, time: SequencerTime) -> Vec<RowEvent> {
    let Some(chip_timelines) = doc.timelines.get(chip) else {
        return Vec::new();
    };
    let Some(timeline) = chip_timelines.get(channel) else {
        return Vec::new();
    };
    let Some(cell) = timeline.get(time.grid) else {
        return Vec::new();
    };
    let Some(grid_cell) = doc.grid_cells.get(time.grid) else {
        return Vec::new();
    };

    let ticks_per_beat = doc.sequencer_options.ticks_per_beat;
    let target_tick = time.beat * ticks_per_beat + time.tick;

    let mut iter = TimelineCellIter::new();
    let mut found = Vec::new();
    while let Some(pat) = iter.next(cell, grid_cell.nbeats) {
        let block_start_tick = pat.begin_time * ticks_per_beat;
        let block_end_tick = round_to_int(pat.end_time) * ticks_per_beat;
        if target_tick < block_start_tick || target_tick >= block_end_tick {
            continue;
        }
        let rel_tick = target_tick - block_start_tick;
        for ev in pat.events {
            let ev_tick = round_to_int(ev.time.anchor_beat * ticks_per_beat) + ev.time.tick_offset;
            if ev_tick == rel_tick {
                found.push(ev.v);
            }
        }
    }
    found
}

/// Drives playback position. Owns no driver state — just converts "what
/// tick are we at" into "which events fire now", one channel at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequencer {
    tick: SequencerTick,
    playing: bool,
}

impl Sequencer {
    pub fn new() -> Self {
        Self { tick: 0, playing: false }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_tick(&self) -> SequencerTick {
        self.tick
    }

    /// Begin playback at `tick` (e.g. in response to a `PlayFrom` command).
    pub fn play_from(&mut self, tick: TickT) {
        self.tick = tick;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Advance one tick and return every channel's due events, as
    /// `events[chip][channel]` (itself a `Vec<RowEvent>`, since a channel's
    /// sorted event list may — rarely — hold more than one event at the
    /// exact same tick). Returns `None` (and does not advance) when
    /// playback is stopped.
    pub fn tick(&mut self, doc: &Document) -> Option<Vec<Vec<Vec<RowEvent>>>> {
        if !self.playing {
            return None;
        }

        let time = grid_cell_for_tick(doc, self.tick);
        let events = doc
            .chips
            .iter()
            .enumerate()
            .map(|(chip_idx, kind)| {
                (0..kind.num_channels())
                    .map(|channel| events_at(doc, chip_idx, channel, time))
                    .collect()
            })
            .collect();

        self.tick += 1;
        Some(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{GridCell, Note, Pattern, TimeInPattern as TiP, TimedRowEvent, TimelineBlock, TimelineCell};
    use num_rational::Ratio;

    fn doc_with_single_note(note: i16) -> Document {
        let mut doc = Document::empty();
        doc.grid_cells.push(GridCell { nbeats: Ratio::new(4, 1) });
        let mut ev = RowEvent::default();
        ev.note = Some(Note(note));
        let events = vec![TimedRowEvent::new(TiP::new(Ratio::new(0, 1), 0), ev)];
        let cell = TimelineCell::new(vec![TimelineBlock::new(0, None, Pattern::new(events))]);
        doc.timelines[0][0].push(cell);
        doc.timelines[0][1].push(TimelineCell::default());
        doc
    }

    #[test]
    fn not_playing_returns_none() {
        let doc = doc_with_single_note(69);
        let mut seq = Sequencer::new();
        assert!(seq.tick(&doc).is_none());
    }

    #[test]
    fn emits_note_at_tick_zero_only() {
        let doc = doc_with_single_note(69);
        let mut seq = Sequencer::new();
        seq.play_from(0);

        let first = seq.tick(&doc).unwrap();
        assert_eq!(first[0][0].len(), 1);
        assert_eq!(first[0][0][0].note, Some(Note(69)));

        let second = seq.tick(&doc).unwrap();
        assert!(second[0][0].is_empty());
    }

    #[test]
    fn stop_halts_ticking() {
        let doc = doc_with_single_note(69);
        let mut seq = Sequencer::new();
        seq.play_from(0);
        seq.tick(&doc);
        seq.stop();
        assert!(seq.tick(&doc).is_none());
    }
}
