//! Beat/row/measure time utilities (C9): converting between continuous
//! tick-time and the musically-meaningful grid-cell/beat/row coordinates the
//! GUI displays.
//!
//! Grounded on `timing_common.h`/`.cpp` and `doc_util/time_util.h`/`.cpp` and
//! `gui/gui_time.h`/`.cpp` in the original implementation.

use crate::doc::{round_to_int, BeatFraction, Document, TickT};

/// A song-wide position expressed as ticks since playback began.
pub type SequencerTick = TickT;

/// Which grid cell, and how many beats into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridAndBeat {
    pub grid: usize,
    pub beat: i32,
}

impl GridAndBeat {
    pub fn new(grid: usize, beat: i32) -> Self {
        Self { grid, beat }
    }
}

/// A fully-resolved sequencer position: which grid cell is playing, how many
/// beats into it, and how many ticks into that beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerTime {
    pub grid: usize,
    pub beat: i32,
    pub tick: TickT,
}

/// Convert a grid-relative beat count and `ticks_per_beat` into a tick
/// count, then locate which grid cell (and beat within it) that tick falls
/// in. Grid cells are walked in order; a `tick` beyond the last grid cell
/// clamps to one-past the final cell (caller-checked via [`BeatIter`]).
pub fn grid_cell_for_tick(doc: &Document, tick: SequencerTick) -> SequencerTime {
    let ticks_per_beat = doc.sequencer_options.ticks_per_beat;
    let mut remaining_beats_num = tick / ticks_per_beat;
    let tick_in_beat = tick.rem_euclid(ticks_per_beat);

    for (grid_idx, cell) in doc.grid_cells.iter().enumerate() {
        let cell_beats = round_to_int(cell.nbeats);
        if remaining_beats_num < cell_beats || grid_idx + 1 == doc.grid_cells.len() {
            return SequencerTime {
                grid: grid_idx,
                beat: remaining_beats_num,
                tick: tick_in_beat,
            };
        }
        remaining_beats_num -= cell_beats;
    }

    SequencerTime {
        grid: 0,
        beat: remaining_beats_num,
        tick: tick_in_beat,
    }
}

/// Forward iterator over beat boundaries within a single grid cell.
///
/// Yields `0, 1, 2, ..` up to (but not including) `nbeats`, rounded to the
/// nearest integer beat. Mirrors `BeatIter` in `doc_util/time_util.cpp`.
#[derive(Debug, Clone)]
pub struct BeatIter {
    next_beat: i32,
    end_beat: i32,
}

impl BeatIter {
    pub fn new(nbeats: BeatFraction) -> Self {
        Self {
            next_beat: 0,
            end_beat: round_to_int(nbeats),
        }
    }
}

impl Iterator for BeatIter {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.next_beat >= self.end_beat {
            return None;
        }
        let beat = self.next_beat;
        self.next_beat += 1;
        Some(beat)
    }
}

/// Forward iterator over row boundaries within a single beat, spaced
/// `rows_per_beat` apart (ties to `ticks_per_beat`/`ticks_per_row` upstream).
/// Mirrors `RowIter` in `doc_util/time_util.cpp`.
#[derive(Debug, Clone)]
pub struct RowIter {
    next_row: i32,
    rows_per_beat: i32,
}

impl RowIter {
    pub fn new(rows_per_beat: i32) -> Self {
        assert!(rows_per_beat > 0, "rows_per_beat must be positive");
        Self {
            next_row: 0,
            rows_per_beat,
        }
    }

    /// Peek without advancing.
    pub fn peek(&self) -> i32 {
        self.next_row
    }

    pub fn next(&mut self) -> i32 {
        let row = self.next_row;
        self.next_row += 1;
        row
    }

    /// Step backward one row, clamping at 0. Used by the GUI to redraw the
    /// row before an edit cursor.
    pub fn try_prev(&mut self) -> Option<i32> {
        if self.next_row == 0 {
            return None;
        }
        self.next_row -= 1;
        Some(self.next_row)
    }

    pub fn is_row_boundary(&self, row: i32) -> bool {
        row % self.rows_per_beat == 0
    }
}

/// True if `beat` falls on a measure boundary, i.e. `beat % beats_per_measure
/// == 0`. Used by the GUI to draw heavier measure lines.
pub fn is_measure_boundary(doc: &Document, beat: i32) -> bool {
    beat.rem_euclid(doc.sequencer_options.beats_per_measure) == 0
}

/// Forward iterator over measure boundaries within a grid cell: every `n`th
/// beat, where `n = beats_per_measure`. Mirrors `MeasureIter` in
/// `doc_util/time_util.cpp`.
#[derive(Debug, Clone)]
pub struct MeasureIter {
    next_beat: i32,
    end_beat: i32,
    beats_per_measure: i32,
}

impl MeasureIter {
    pub fn new(nbeats: BeatFraction, beats_per_measure: i32) -> Self {
        assert!(beats_per_measure > 0, "beats_per_measure must be positive");
        Self {
            next_beat: 0,
            end_beat: round_to_int(nbeats),
            beats_per_measure,
        }
    }
}

impl Iterator for MeasureIter {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.next_beat >= self.end_beat {
            return None;
        }
        let beat = self.next_beat;
        self.next_beat += self.beats_per_measure;
        Some(beat)
    }
}
