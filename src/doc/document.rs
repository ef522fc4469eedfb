//! The document: the GUI-owned, audio-thread-snapshotted song.
//!
//! Blocks own their pattern; patterns own their event list. Cells own their
//! blocks. Timelines own their cells. Instruments and samples are owned by
//! the document and referenced everywhere else purely by integer index,
//! never by back-pointer (spec.md §3).

use serde::{Deserialize, Serialize};

use crate::error::{DocError, DocResult};

use super::chip_common::ChipKind;
use super::events::CHROMATIC_COUNT;
use super::instrument::Instrument;
use super::sample::Sample;
use super::timeline::{GridCell, Timeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccidentalMode {
    Sharp,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerOptions {
    pub ticks_per_beat: i32,
    pub beats_per_measure: i32,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            ticks_per_beat: 24,
            beats_per_measure: 4,
        }
    }
}

/// Build a 12-tone equal-temperament frequency table, in Hz, indexed by
/// chromatic pitch.
pub fn equal_temperament(root_chromatic: i32, root_frequency: f64) -> Vec<f64> {
    (0..CHROMATIC_COUNT as i32)
        .map(|i| root_frequency * 2f64.powf((i - root_chromatic) as f64 / 12.0))
        .collect()
}

/// `[chip][channel]` -> one channel's whole-song timeline (a `Vec` of grid
/// cells, one per entry in `Document::grid_cells`).
pub type ChipChannelTimelines = Vec<Vec<Timeline>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub sequencer_options: SequencerOptions,
    /// Length `CHROMATIC_COUNT`, in Hz.
    pub frequency_table: Vec<f64>,
    pub accidental_mode: AccidentalMode,
    pub instruments: Vec<Instrument>,
    pub samples: Vec<Option<Sample>>,
    pub chips: Vec<ChipKind>,
    pub grid_cells: Vec<GridCell>,
    pub timelines: ChipChannelTimelines,
}

impl Document {
    /// An empty document with one `Apu1` chip and no events: the baseline
    /// used by "empty document plays silence" (spec.md §8 scenario 1) and
    /// as the starting point for undo history tests.
    pub fn empty() -> Self {
        let chips = vec![ChipKind::Apu1];
        let timelines = chips.iter().map(|c| vec![Vec::new(); c.num_channels()]).collect();
        Self {
            sequencer_options: SequencerOptions::default(),
            frequency_table: equal_temperament(69, 440.0),
            accidental_mode: AccidentalMode::Sharp,
            instruments: Vec::new(),
            samples: vec![None; 256],
            chips,
            grid_cells: Vec::new(),
            timelines,
        }
    }

    /// Validate document-level invariants that a file loader must uphold
    /// before handing a document to the audio thread (spec.md §6, §7.2):
    /// block layout, sample lengths, and instrument/sample index ranges.
    /// Never called from the audio thread.
    pub fn validate(&self) -> DocResult<()> {
        for (chip_idx, chip_timelines) in self.timelines.iter().enumerate() {
            for (channel_idx, timeline) in chip_timelines.iter().enumerate() {
                for (grid_idx, cell) in timeline.iter().enumerate() {
                    let mut prev_end: Option<i32> = None;
                    for block in &cell.blocks {
                        let end = block.end_time.unwrap_or(i32::MAX);
                        if block.begin_time >= end {
                            return Err(DocError::MalformedBlock {
                                grid: grid_idx,
                                chip: chip_idx,
                                channel: channel_idx,
                                begin: block.begin_time,
                                end,
                            });
                        }
                        if let Some(prev_end) = prev_end {
                            if block.begin_time < prev_end {
                                return Err(DocError::OverlappingBlocks {
                                    grid: grid_idx,
                                    chip: chip_idx,
                                    channel: channel_idx,
                                });
                            }
                        }
                        prev_end = block.end_time;
                    }
                }
            }
        }

        for (index, sample) in self.samples.iter().enumerate() {
            let Some(sample) = sample else { continue };
            if sample.brr.len() % 9 != 0 {
                return Err(DocError::SampleLengthNotMultipleOf9 {
                    index,
                    name: sample.name.clone(),
                    len: sample.brr.len(),
                });
            }
            if sample.loop_offset % 9 != 0 {
                return Err(DocError::SampleLoopNotMultipleOf9 {
                    index,
                    name: sample.name.clone(),
                    loop_offset: sample.loop_offset,
                });
            }
        }

        for (index, instr) in self.instruments.iter().enumerate() {
            for entry in &instr.keysplit {
                if self.samples.get(entry.sample as usize).is_none() {
                    return Err(DocError::InstrumentSampleOutOfRange {
                        index,
                        sample: entry.sample as usize,
                    });
                }
            }
        }

        Ok(())
    }
}
