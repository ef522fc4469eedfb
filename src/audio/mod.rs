//! The audio pipeline: sequencer (C4), chip drivers (C3), chip emulation +
//! resampling (C5), and the overall synth callback (C6).

pub mod chip_emu;
pub mod driver;
pub mod envelope;
pub mod sequencer;
pub mod synth;
pub mod tuning;
pub mod volume_calc;

pub use chip_emu::{Apu1Emu, Apu2Emu, BandlimitedSynth, ChipEmu};
pub use driver::{
    ChipDriver, DpcmDriver, NoiseDriver, PulseDriver, RegisterWrite, RegisterWriteQueue, TriangleDriver,
    NES_CLOCK_HZ,
};
pub use envelope::EnvelopeIterator;
pub use sequencer::Sequencer;
pub use synth::{AudioOptions, OverallSynth};
pub use tuning::{make_tuning_table, register_quantize};
pub use volume_calc::volume_mul_4x4_4;
