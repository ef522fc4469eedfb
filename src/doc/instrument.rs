//! Instruments: named envelopes describing how volume/arpeggio/duty/pitch
//! evolve over the lifetime of a note.

use serde::{Deserialize, Serialize};

/// A time-varying per-instrument parameter (volume, arpeggio, duty/wave,
/// pitch). A sequence of small integers, with optional release and loop
/// points.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Envelope {
    pub values: Vec<i8>,
    /// Index to jump to (and hold thereafter, if there is no loop past it)
    /// when the note is released. `None` if releasing should just keep
    /// playing forward.
    pub release_index: Option<u16>,
    /// Index to loop back to once the end of `values` is reached.
    pub loop_index: Option<u16>,
}

impl Envelope {
    pub fn new(values: Vec<i8>) -> Self {
        Self {
            values,
            release_index: None,
            loop_index: None,
        }
    }

    pub fn get(&self, position: usize) -> i8 {
        self.values.get(position).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A note range mapped to a sample + pitch-shift pair, for sample-playback
/// chips (e.g. DPCM/BRR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysplitEntry {
    pub low_note: i16,
    pub high_note: i16,
    pub sample: u8,
    pub patch: u8,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub volume: Envelope,
    pub arpeggio: Envelope,
    pub wave_index: Envelope,
    pub pitch: Envelope,
    /// Present only for chips that play back samples rather than synthesize
    /// waveforms.
    pub keysplit: Vec<KeysplitEntry>,
}

impl Instrument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_get_past_end_is_zero() {
        let env = Envelope::new(vec![1, 2, 3]);
        assert_eq!(env.get(0), 1);
        assert_eq!(env.get(2), 3);
        assert_eq!(env.get(3), 0);
        assert_eq!(env.get(1000), 0);
    }
}
