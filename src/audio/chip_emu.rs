//! Chip emulation + band-limited resampling (C5): turns a stream of
//! [`RegisterWrite`]s into PCM samples.
//!
//! This is a simple (non-cycle-accurate) reference emulation, not a
//! bit-exact NES APU core — accurate enough to audibly distinguish silence,
//! low notes, and high notes (spec.md §5 non-goal: no cycle-accurate
//! emulation). Grounded structurally on the `SoundChip` trait in
//! `examples/moriyoshi-vgmck-rs/src/chips/mod.rs` (this crate's teacher).

use super::driver::{RegisterWrite, RegisterWriteQueue};

/// Implemented by every chip's emulation core: accepts register writes and
/// renders PCM.
pub trait BandlimitedSynth {
    /// Apply every register write queued since the last render.
    fn apply_writes(&mut self, writes: &RegisterWriteQueue);

    /// Render `frames` mono samples in `[-1.0, 1.0]`, advancing internal
    /// phase by `frames / sample_rate` seconds.
    fn render(&mut self, out: &mut [f32], sample_rate: f64);
}

#[derive(Debug, Clone, Copy, Default)]
struct PulseState {
    duty: u8,
    volume: u8,
    period: u16,
    enabled: bool,
}

/// Reference emulation of the two pulse channels (the `Apu1` chip slot).
/// Naively band-limits by averaging a naive square wave over each output
/// sample instead of oversampling — adequate for distinguishing notes, not
/// for bit-exact waveform comparison.
#[derive(Debug, Clone, Default)]
pub struct Apu1Emu {
    pulses: [PulseState; 2],
    phase: [f64; 2],
}

impl Apu1Emu {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_single(state: &mut PulseState, write: RegisterWrite, channel: u16) {
        let offset = write.address - (0x4000 + channel * 4);
        match offset {
            0 => {
                state.duty = (write.value >> 6) & 0x3;
                state.volume = write.value & 0x0F;
                state.enabled = state.volume > 0;
            }
            2 => {
                state.period = (state.period & 0x700) | write.value as u16;
            }
            3 => {
                state.period = (state.period & 0xFF) | ((write.value as u16 & 0x07) << 8);
            }
            _ => {}
        }
    }
}

impl BandlimitedSynth for Apu1Emu {
    fn apply_writes(&mut self, writes: &RegisterWriteQueue) {
        for &write in writes {
            if (0x4000..0x4004).contains(&write.address) {
                Self::apply_single(&mut self.pulses[0], write, 0);
            } else if (0x4004..0x4008).contains(&write.address) {
                Self::apply_single(&mut self.pulses[1], write, 1);
            }
        }
    }

    fn render(&mut self, out: &mut [f32], sample_rate: f64) {
        const DUTY_FRACTION: [f64; 4] = [0.125, 0.25, 0.5, 0.75];

        out.fill(0.0);
        for (ch, pulse) in self.pulses.iter().enumerate() {
            if !pulse.enabled {
                continue;
            }
            let freq = super::driver::NES_CLOCK_HZ / (16.0 * (pulse.period as f64 + 1.0));
            if !freq.is_finite() || freq <= 0.0 {
                continue;
            }
            let amplitude = pulse.volume as f64 / 15.0;
            let duty = DUTY_FRACTION[pulse.duty as usize];
            let phase_step = freq / sample_rate;

            for sample in out.iter_mut() {
                let value = if self.phase[ch] < duty { amplitude } else { -amplitude };
                *sample += value as f32;
                self.phase[ch] = (self.phase[ch] + phase_step).fract();
            }
        }
        // Two channels summed; scale down so full-volume unison doesn't clip.
        for sample in out.iter_mut() {
            *sample *= 0.5;
        }
    }
}

/// The 32-step triangle waveform, scaled to `[-1.0, 1.0]`.
const TRIANGLE_WAVE: [f32; 32] = [
    1.0, 0.875, 0.75, 0.625, 0.5, 0.375, 0.25, 0.125, 0.0, -0.125, -0.25, -0.375, -0.5, -0.625,
    -0.75, -0.875, -1.0, -0.875, -0.75, -0.625, -0.5, -0.375, -0.25, -0.125, 0.0, 0.125, 0.25,
    0.375, 0.5, 0.625, 0.75, 0.875,
];

#[derive(Debug, Clone, Copy, Default)]
struct TriangleState {
    period: u16,
    enabled: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct NoiseState {
    volume: u8,
    period_reg: u8,
}

/// Reference emulation of the triangle and noise channels (the `Apu2` chip
/// slot). DPCM is accepted but not rendered: sample playback requires the
/// document's raw BRR payloads, which the chip emulator never sees — only
/// register writes — so DPCM stays register-accurate but silent here
/// (spec.md §5 non-goal).
#[derive(Debug, Clone, Default)]
pub struct Apu2Emu {
    triangle: TriangleState,
    noise: NoiseState,
    tri_phase: f64,
    noise_shift: u16,
}

const NOISE_PERIOD_TABLE: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

impl Apu2Emu {
    pub fn new() -> Self {
        Self {
            noise_shift: 1,
            ..Default::default()
        }
    }

    fn step_noise(&mut self) -> bool {
        let bit0 = self.noise_shift & 1;
        let bit1 = (self.noise_shift >> 1) & 1;
        let feedback = bit0 ^ bit1;
        self.noise_shift >>= 1;
        self.noise_shift |= feedback << 14;
        bit0 == 0
    }
}

impl BandlimitedSynth for Apu2Emu {
    fn apply_writes(&mut self, writes: &RegisterWriteQueue) {
        for &write in writes {
            match write.address {
                0x4008 => self.triangle.enabled = write.value & 0x80 != 0 || write.value > 0,
                0x400A => self.triangle.period = (self.triangle.period & 0x700) | write.value as u16,
                0x400B => {
                    self.triangle.period = (self.triangle.period & 0xFF) | ((write.value as u16 & 0x07) << 8)
                }
                0x400C => self.noise.volume = write.value & 0x0F,
                0x400E => self.noise.period_reg = write.value & 0x0F,
                0x4015 => {
                    if write.value & 0x04 == 0 {
                        self.triangle.enabled = false;
                    }
                    if write.value & 0x08 == 0 {
                        self.noise.volume = 0;
                    }
                }
                _ => {}
            }
        }
    }

    fn render(&mut self, out: &mut [f32], sample_rate: f64) {
        out.fill(0.0);

        if self.triangle.enabled {
            let freq = super::driver::NES_CLOCK_HZ / (32.0 * (self.triangle.period as f64 + 1.0));
            if freq.is_finite() && freq > 0.0 {
                let phase_step = freq * 32.0 / sample_rate;
                for sample in out.iter_mut() {
                    let index = (self.tri_phase as usize) % TRIANGLE_WAVE.len();
                    *sample += TRIANGLE_WAVE[index] * 0.5;
                    self.tri_phase = (self.tri_phase + phase_step) % TRIANGLE_WAVE.len() as f64;
                }
            }
        }

        if self.noise.volume > 0 {
            let period = NOISE_PERIOD_TABLE[(self.noise.period_reg & 0xF) as usize];
            let freq = super::driver::NES_CLOCK_HZ / period as f64;
            let amplitude = self.noise.volume as f32 / 15.0;
            let steps_per_sample = (freq / sample_rate).max(0.0);
            let mut accum = 0.0;
            for sample in out.iter_mut() {
                accum += steps_per_sample;
                while accum >= 1.0 {
                    accum -= 1.0;
                    let high = self.step_noise();
                    *sample += if high { amplitude } else { -amplitude } * 0.5;
                }
            }
        }
    }
}

/// One chip slot's emulation core, dispatched by [`crate::doc::ChipKind`].
pub enum ChipEmu {
    Apu1(Apu1Emu),
    Apu2(Apu2Emu),
}

impl ChipEmu {
    pub fn new(kind: crate::doc::ChipKind) -> Self {
        match kind {
            crate::doc::ChipKind::Apu1 => ChipEmu::Apu1(Apu1Emu::new()),
            crate::doc::ChipKind::Apu2 => ChipEmu::Apu2(Apu2Emu::new()),
        }
    }
}

impl BandlimitedSynth for ChipEmu {
    fn apply_writes(&mut self, writes: &RegisterWriteQueue) {
        match self {
            ChipEmu::Apu1(emu) => emu.apply_writes(writes),
            ChipEmu::Apu2(emu) => emu.apply_writes(writes),
        }
    }

    fn render(&mut self, out: &mut [f32], sample_rate: f64) {
        match self {
            ChipEmu::Apu1(emu) => emu.render(out, sample_rate),
            ChipEmu::Apu2(emu) => emu.render(out, sample_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_when_no_writes_applied() {
        let mut emu = Apu1Emu::new();
        let mut out = [0f32; 64];
        emu.render(&mut out, 44100.0);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn note_produces_nonzero_output() {
        let mut emu = Apu1Emu::new();
        emu.apply_writes(&[
            RegisterWrite { address: 0x4000, value: 0x8F },
            RegisterWrite { address: 0x4002, value: 0x80 },
            RegisterWrite { address: 0x4003, value: 0x02 },
        ]);
        let mut out = [0f32; 256];
        emu.render(&mut out, 44100.0);
        assert!(out.iter().any(|&s| s != 0.0));
    }
}
