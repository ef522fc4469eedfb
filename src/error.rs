//! Error taxonomy for the document loader and edit/history layers.
//!
//! Programmer errors (contract violations inside the audio thread, e.g. a
//! volume product with out-of-range inputs) are not represented here; those
//! are `assert!`/`debug_assert!` panics, since they are never meant to be
//! recovered from (see spec.md §7, tier 1).

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("timeline block at grid {grid}, chip {chip}, channel {channel}: begin_time {begin} >= end_time {end}")]
    MalformedBlock {
        grid: usize,
        chip: usize,
        channel: usize,
        begin: i32,
        end: i32,
    },

    #[error("timeline blocks overlap at grid {grid}, chip {chip}, channel {channel}")]
    OverlappingBlocks {
        grid: usize,
        chip: usize,
        channel: usize,
    },

    #[error("sample {index} ({name:?}) has BRR length {len}, which is not a multiple of 9")]
    SampleLengthNotMultipleOf9 {
        index: usize,
        name: String,
        len: usize,
    },

    #[error("sample {index} ({name:?}) has loop_offset {loop_offset}, which is not a multiple of 9")]
    SampleLoopNotMultipleOf9 {
        index: usize,
        name: String,
        loop_offset: u16,
    },

    #[error("instrument {index} references out-of-range sample {sample}")]
    InstrumentSampleOutOfRange { index: usize, sample: usize },
}

pub type DocResult<T> = std::result::Result<T, DocError>;
