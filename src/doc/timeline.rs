//! The timeline: per-channel grid cells, each holding zero or more
//! non-overlapping blocks, each block playing (and optionally looping) a
//! pattern of events.
//!
//! Grounded on `doc/timeline.h` / `doc/timeline.cpp` and
//! `timeline_iter.h` / `timeline_iter.cpp` in the original implementation.
//! [`TimelineCellIter`] is implemented as an explicit state machine rather
//! than the original's Duff's-device coroutine macro (spec.md §9).

use serde::{Deserialize, Serialize};

use super::kv::EventList;
use super::timed_events::{round_to_int, BeatFraction};

/// Index of a beat, measured from the start of a grid cell.
pub type BeatIndex = i32;

/// The reusable event container. Optionally loops its first `loop_length`
/// beats to fill however long the enclosing block plays it for.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pattern {
    pub events: EventList,

    /// Loop length in beats. Zero means "do not loop".
    pub loop_length: u32,
}

impl Pattern {
    pub fn new(events: EventList) -> Self {
        Self {
            events,
            loop_length: 0,
        }
    }

    pub fn looped(events: EventList, loop_length: u32) -> Self {
        Self {
            events,
            loop_length,
        }
    }
}

/// One occurrence of a pattern on the timeline.
///
/// Invariant: `begin_time < end_time` (an equal-length block could never be
/// selected). Invariant: a block never crosses a grid-cell boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineBlock {
    pub begin_time: BeatIndex,
    /// `None` means "extends to the end of the grid cell".
    pub end_time: Option<BeatIndex>,
    pub pattern: Pattern,
}

impl TimelineBlock {
    pub fn new(begin_time: BeatIndex, end_time: Option<BeatIndex>, pattern: Pattern) -> Self {
        Self {
            begin_time,
            end_time,
            pattern,
        }
    }

    fn end_time_or(&self, nbeats: BeatFraction) -> BeatFraction {
        match self.end_time {
            Some(t) => BeatFraction::from(t).min(nbeats),
            None => nbeats,
        }
    }
}

/// One channel, one grid cell: an ordered, non-overlapping list of blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelineCell {
    pub blocks: Vec<TimelineBlock>,
}

impl TimelineCell {
    pub fn new(blocks: Vec<TimelineBlock>) -> Self {
        Self { blocks }
    }
}

/// The length, in beats, of one grid slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub nbeats: BeatFraction,
}

/// One channel, whole song: a list of grid cells in order.
pub type Timeline = Vec<TimelineCell>;

/// A view into one visible slice of one block, during one loop iteration.
///
/// Can be constructed from a [`TimelineBlock`]/[`Pattern`] without
/// allocating, so it is safe to hand to the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternRef<'a> {
    pub block: usize,

    /// Timestamps within the current grid cell.
    pub begin_time: BeatIndex,
    pub end_time: BeatFraction,

    /// True only on the first loop of a block.
    pub is_block_begin: bool,
    /// True only on the last loop of a block.
    pub is_block_end: bool,

    /// Events carrying timestamps relative to `begin_time`.
    pub events: &'a [super::timed_events::TimedRowEvent],
}

/// Index of the first event whose `anchor_beat >= rel_end_time`, i.e. the
/// number of leading events that survive truncation to `rel_end_time`
/// beats.
fn calc_end_ev(events: &EventList, rel_end_time: BeatFraction) -> usize {
    events.partition_point(|ev| ev.time.anchor_beat < rel_end_time)
}

/// Pull iterator over one [`TimelineCell`], yielding one [`PatternRef`] per
/// loop instance of each in-bounds block. Holds no heap allocation and
/// advances in O(1) amortized per step.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineCellIter {
    block: usize,
    loop_begin_time: BeatIndex,
    /// None: haven't entered a block's loop yet. Some: mid-loop.
    in_loop: bool,
}

impl TimelineCellIter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `cell`/`nbeats` must be the same values across the lifetime of one
    /// iteration; restart with a fresh `TimelineCellIter` to rescan.
    pub fn next<'a>(&mut self, cell: &'a TimelineCell, nbeats: BeatFraction) -> Option<PatternRef<'a>> {
        while self.block < cell.blocks.len() {
            let block = &cell.blocks[self.block];

            if BeatFraction::from(block.begin_time) >= nbeats {
                // Out of bounds: this and all subsequent blocks are dropped.
                self.block = cell.blocks.len();
                return None;
            }

            let block_end_time = block.end_time_or(nbeats);
            assert!(
                block_end_time >= BeatFraction::from(block.begin_time),
                "malformed block: end_time < begin_time (should have been rejected at load time)"
            );

            if block.pattern.loop_length == 0 {
                self.block += 1;
                let end_ev = calc_end_ev(
                    &block.pattern.events,
                    block_end_time - BeatFraction::from(block.begin_time),
                );
                return Some(PatternRef {
                    block: self.block - 1,
                    begin_time: block.begin_time,
                    end_time: block_end_time,
                    is_block_begin: true,
                    is_block_end: true,
                    events: &block.pattern.events[..end_ev],
                });
            }

            let loop_length = BeatFraction::from(block.pattern.loop_length as i32);

            if !self.in_loop {
                self.in_loop = true;
                self.loop_begin_time = block.begin_time;
            }

            if BeatFraction::from(self.loop_begin_time) < block_end_time {
                let loop_begin = self.loop_begin_time;
                let loop_end = (BeatFraction::from(loop_begin) + loop_length).min(block_end_time);

                let is_block_begin = loop_begin == block.begin_time;
                let is_block_end = loop_end == block_end_time;

                let end_ev = if is_block_end {
                    calc_end_ev(&block.pattern.events, loop_end - BeatFraction::from(loop_begin))
                } else {
                    calc_end_ev(&block.pattern.events, loop_length)
                };

                self.loop_begin_time = round_to_int(BeatFraction::from(loop_begin) + loop_length);

                if is_block_end {
                    self.block += 1;
                    self.in_loop = false;
                }

                return Some(PatternRef {
                    block: self.block - if is_block_end { 1 } else { 0 },
                    begin_time: loop_begin,
                    end_time: loop_end,
                    is_block_begin,
                    is_block_end,
                    events: &block.pattern.events[..end_ev],
                });
            }

            self.block += 1;
            self.in_loop = false;
        }
        None
    }
}
