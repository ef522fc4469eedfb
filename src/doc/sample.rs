//! Sample-playback data (BRR-encoded, as used by sample-based chips).

use serde::{Deserialize, Serialize};

/// Tuning metadata needed to pitch a sample's playback rate to a chromatic
/// note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleTuning {
    pub sample_rate: u32,
    pub root_key: i16,
    pub detune_cents: i16,
}

/// A BRR-encoded sample. `brr.len()` must be a multiple of 9 (one BRR
/// block); `loop_offset` must also be a multiple of 9 when the sample
/// loops. Both are enforced by [`crate::doc::document::Document::validate`],
/// not by the constructor, matching the original's "load then validate"
/// split (spec.md §6/§7.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub name: String,
    pub brr: Vec<u8>,
    pub loop_offset: u16,
    pub tuning: SampleTuning,
}

impl Sample {
    pub fn new(name: impl Into<String>, brr: Vec<u8>, tuning: SampleTuning) -> Self {
        Self {
            name: name.into(),
            brr,
            loop_offset: 0,
            tuning,
        }
    }
}
