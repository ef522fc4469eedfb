//! Which chip occupies each slot, and how many channels it has.
//!
//! This crate only models the 2A03 (NES APU), split the way the original
//! implementation splits it: `Apu1` (the two pulse channels, sharing a
//! sweep-disabled register layout) and `Apu2` (triangle, noise, DPCM).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChipKind {
    Apu1,
    Apu2,
}

impl ChipKind {
    pub fn num_channels(self) -> usize {
        match self {
            ChipKind::Apu1 => 2,
            ChipKind::Apu2 => 3,
        }
    }
}

/// Channel indices within an [`ChipKind::Apu1`] slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apu1ChannelId {
    Pulse1 = 0,
    Pulse2 = 1,
}

/// Channel indices within an [`ChipKind::Apu2`] slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apu2ChannelId {
    Tri = 0,
    Noise = 1,
    Dpcm = 2,
}
