//! The document model (spec.md §3/§6): everything the GUI thread owns and
//! the audio thread only ever sees frozen snapshots of.

pub mod chip_common;
pub mod document;
pub mod events;
pub mod instrument;
pub mod kv;
pub mod sample;
pub mod timed_events;
pub mod timeline;

pub use chip_common::{Apu1ChannelId, Apu2ChannelId, ChipKind};
pub use document::{equal_temperament, AccidentalMode, ChipChannelTimelines, Document, SequencerOptions};
pub use events::{Effect, Note, RowEvent, Volume, CHROMATIC_COUNT, MAX_EFFECTS_PER_ROW, MAX_VOLUME};
pub use instrument::{Envelope, Instrument, KeysplitEntry};
pub use kv::{erase_empty, Kv};
pub use sample::{Sample, SampleTuning};
pub use timed_events::{round_to_int, BeatFraction, FractionInt, TickT, TimeInPattern, TimedRowEvent};
pub use timeline::{
    BeatIndex, GridCell, Pattern, PatternRef, Timeline, TimelineBlock, TimelineCell, TimelineCellIter,
};
