//! Per-channel chip drivers (C3): turn a channel's `RowEvent`/instrument
//! state into 2A03 register writes, one sequencer tick at a time.
//!
//! Grounded on `audio/synth/nes_2a03_driver.cpp` in the original
//! implementation, and on the register-write idioms of
//! `examples/moriyoshi-vgmck-rs/src/chips/nes_apu.rs` (this crate's teacher)
//! for how a chip driver accumulates and emits diffed register writes.

use crate::doc::{ChipKind, Document, Instrument, Note, RowEvent};

use super::envelope::EnvelopeIterator;
use super::tuning::make_tuning_table;
use super::volume_calc::volume_mul_4x4_4;

/// NES CPU clock, used to build every channel's period table.
pub const NES_CLOCK_HZ: f64 = 1_789_773.0;

/// One write to a chip register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub address: u16,
    pub value: u8,
}

/// A tick's worth of register writes, in program order. Drivers only push
/// writes whose value actually changed since the previous tick (spec.md
/// §4's diff-emission rule) — this keeps steady-state playback mostly
/// silent on the command path to the chip emulator.
pub type RegisterWriteQueue = Vec<RegisterWrite>;

/// Per-channel playback cursor shared by every 2A03 channel driver: which
/// note/instrument is active, and the four envelope cursors that walk it.
#[derive(Debug, Clone, Default)]
struct ChannelCursor {
    note: Option<Note>,
    instrument: Option<u8>,
    volume: EnvelopeIterator,
    arpeggio: EnvelopeIterator,
    wave_index: EnvelopeIterator,
    pitch: EnvelopeIterator,
}

impl ChannelCursor {
    fn note_on(&mut self, note: Note, instr: Option<u8>) {
        self.note = Some(note);
        if instr.is_some() {
            self.instrument = instr;
        }
        self.volume.note_on();
        self.arpeggio.note_on();
        self.wave_index.note_on();
        self.pitch.note_on();
    }

    fn release(&mut self, instrument: Option<&Instrument>) {
        if let Some(instrument) = instrument {
            self.volume.release(&instrument.volume);
            self.arpeggio.release(&instrument.arpeggio);
            self.wave_index.release(&instrument.wave_index);
            self.pitch.release(&instrument.pitch);
        }
    }

    fn cut(&mut self) {
        self.note = None;
    }

    fn tick(&mut self, instrument: Option<&Instrument>) {
        if let Some(instrument) = instrument {
            self.volume.tick(&instrument.volume);
            self.arpeggio.tick(&instrument.arpeggio);
            self.wave_index.tick(&instrument.wave_index);
            self.pitch.tick(&instrument.pitch);
        }
    }

    /// Apply a freshly arrived row event, returning whether a note actually
    /// started/stopped this tick (vs. an effect-only row).
    fn apply_event(&mut self, ev: &RowEvent, instruments: &[Instrument]) {
        if let Some(note) = ev.note {
            if note.is_cut() {
                self.cut();
            } else if note.is_release() {
                let instr = self.instrument.and_then(|i| instruments.get(i as usize));
                self.release(instr);
            } else {
                self.note_on(note, ev.instr);
            }
        } else if ev.instr.is_some() {
            self.instrument = ev.instr;
        }
    }

    fn current_instrument<'a>(&self, instruments: &'a [Instrument]) -> Option<&'a Instrument> {
        self.instrument.and_then(|i| instruments.get(i as usize))
    }
}

/// Resolve the chromatic pitch used to index the tuning table: base note
/// plus arpeggio offset, clamped into range.
fn arpeggiated_note(cursor: &ChannelCursor, instrument: Option<&Instrument>) -> Option<usize> {
    let note = cursor.note?;
    let offset = instrument.map(|i| cursor.arpeggio.value(&i.arpeggio)).unwrap_or(0) as i32;
    let idx = note.0 as i32 + offset;
    if idx < 0 {
        None
    } else {
        Some(idx as usize)
    }
}

/// Apu1 register layout: `$4000`/`$4001`/`$4002`/`$4003` for pulse 1,
/// `$4004..=$4007` for pulse 2. Sweep is always written disabled (`0x08`),
/// since this crate does not model hardware pitch sweep (spec.md §4
/// non-goal).
pub struct PulseDriver {
    base_address: u16,
    cursor: ChannelCursor,
    tuning_table: Vec<u16>,
    prev_regs: [Option<u8>; 4],
}

impl PulseDriver {
    pub fn new(channel_index: u8, frequency_table: &[f64]) -> Self {
        assert!(channel_index < 2, "pulse channel index must be 0 or 1");
        Self {
            base_address: 0x4000 + channel_index as u16 * 4,
            cursor: ChannelCursor::default(),
            tuning_table: make_tuning_table(frequency_table, NES_CLOCK_HZ, 16.0, 0x7FF),
            prev_regs: [None; 4],
        }
    }

    fn push_diff(&mut self, out: &mut RegisterWriteQueue, offset: u16, value: u8) {
        let slot = &mut self.prev_regs[offset as usize];
        if *slot != Some(value) {
            *slot = Some(value);
            out.push(RegisterWrite {
                address: self.base_address + offset,
                value,
            });
        }
    }

    pub fn tick(&mut self, ev: Option<&RowEvent>, doc: &Document, out: &mut RegisterWriteQueue) {
        if let Some(ev) = ev {
            self.cursor.apply_event(ev, &doc.instruments);
        } else {
            self.cursor.tick(self.cursor.current_instrument(&doc.instruments));
        }

        let instrument = self.cursor.current_instrument(&doc.instruments);
        let Some(note_index) = arpeggiated_note(&self.cursor, instrument) else {
            self.push_diff(out, 0, 0x30);
            return;
        };

        let note_volume = ev
            .and_then(|e| e.volume)
            .unwrap_or(crate::doc::MAX_VOLUME);
        let env_volume = instrument.map(|i| self.cursor.volume.value(&i.volume).max(0) as u8).unwrap_or(15);
        let volume = volume_mul_4x4_4(note_volume.min(15), env_volume.min(15));

        let duty = instrument
            .map(|i| (self.cursor.wave_index.value(&i.wave_index) as u8) & 0x3)
            .unwrap_or(2);

        let period = self
            .tuning_table
            .get(note_index)
            .copied()
            .unwrap_or(0)
            .min(0x7FF);

        self.push_diff(out, 0, (duty << 6) | 0x30 | volume);
        self.push_diff(out, 1, 0x08);
        self.push_diff(out, 2, (period & 0xFF) as u8);
        self.push_diff(out, 3, ((period >> 8) as u8) & 0x07);
    }

    pub fn stop_playback(&mut self, out: &mut RegisterWriteQueue) {
        self.cursor.cut();
        self.push_diff(out, 0, 0x30);
    }
}

/// Triangle channel: `$4008`/`$400A`/`$400B`. Linear-counter reload must be
/// re-issued every note-on (spec.md §4's "reload side-effect" note) — bit 7
/// of `$4008` triggers the halt/reload flag, so it is always rewritten
/// alongside the note regardless of the diff cache.
pub struct TriangleDriver {
    cursor: ChannelCursor,
    tuning_table: Vec<u16>,
    prev_period: Option<u16>,
    note_retriggered: bool,
}

impl TriangleDriver {
    pub fn new(frequency_table: &[f64]) -> Self {
        Self {
            cursor: ChannelCursor::default(),
            tuning_table: make_tuning_table(frequency_table, NES_CLOCK_HZ, 32.0, 0x7FF),
            prev_period: None,
            note_retriggered: false,
        }
    }

    pub fn tick(&mut self, ev: Option<&RowEvent>, doc: &Document, out: &mut RegisterWriteQueue) {
        self.note_retriggered = false;
        if let Some(ev) = ev {
            if ev.note.is_some_and(|n| !n.is_cut() && !n.is_release()) {
                self.note_retriggered = true;
            }
            self.cursor.apply_event(ev, &doc.instruments);
        } else {
            self.cursor.tick(self.cursor.current_instrument(&doc.instruments));
        }

        let instrument = self.cursor.current_instrument(&doc.instruments);
        let Some(note_index) = arpeggiated_note(&self.cursor, instrument) else {
            out.push(RegisterWrite { address: 0x4015, value: 0x00 });
            return;
        };

        let period = self
            .tuning_table
            .get(note_index)
            .copied()
            .unwrap_or(0)
            .min(0x7FF);

        let high_byte = ((period >> 8) as u8) & 0x07;
        if self.note_retriggered {
            out.push(RegisterWrite { address: 0x4008, value: 0xFF });
            out.push(RegisterWrite { address: 0x400A, value: (period & 0xFF) as u8 });
            // Reload side-effect: $400B is rewritten on every retrigger even
            // if the period byte hasn't changed (spec.md §4.2).
            out.push(RegisterWrite { address: 0x400B, value: high_byte });
            self.prev_period = Some(period);
        } else if self.prev_period != Some(period) {
            self.prev_period = Some(period);
            out.push(RegisterWrite { address: 0x400A, value: (period & 0xFF) as u8 });
            out.push(RegisterWrite { address: 0x400B, value: high_byte });
        }
    }

    pub fn stop_playback(&mut self, out: &mut RegisterWriteQueue) {
        self.cursor.cut();
        out.push(RegisterWrite { address: 0x4008, value: 0x00 });
    }
}

/// Noise channel: `$400C`/`$400E`. Period is looked up from the note index
/// into the hardware's 16-entry noise period table, not a continuous
/// tuning table.
pub struct NoiseDriver {
    cursor: ChannelCursor,
    prev_vol: Option<u8>,
    prev_period: Option<u8>,
}

impl NoiseDriver {
    pub fn new() -> Self {
        Self {
            cursor: ChannelCursor::default(),
            prev_vol: None,
            prev_period: None,
        }
    }

    pub fn tick(&mut self, ev: Option<&RowEvent>, doc: &Document, out: &mut RegisterWriteQueue) {
        if let Some(ev) = ev {
            self.cursor.apply_event(ev, &doc.instruments);
        } else {
            self.cursor.tick(self.cursor.current_instrument(&doc.instruments));
        }

        let instrument = self.cursor.current_instrument(&doc.instruments);
        let Some(note_index) = arpeggiated_note(&self.cursor, instrument) else {
            self.push_vol(out, 0x30);
            return;
        };

        let note_volume = ev.and_then(|e| e.volume).unwrap_or(crate::doc::MAX_VOLUME);
        let env_volume = instrument.map(|i| self.cursor.volume.value(&i.volume).max(0) as u8).unwrap_or(15);
        let volume = volume_mul_4x4_4(note_volume.min(15), env_volume.min(15));
        self.push_vol(out, 0x30 | volume);

        // Pitch register: `((note+arp) & 0xF) ^ 0xF` (spec.md §4.2) — not the
        // hardware noise-period table, a simpler approximation this driver
        // uses in its place.
        let pitch = ((note_index as u8) & 0xF) ^ 0xF;
        let mode = instrument
            .map(|i| (self.cursor.wave_index.value(&i.wave_index) & 1) as u8)
            .unwrap_or(0);
        let period_reg = pitch | (mode << 7);
        if self.prev_period != Some(period_reg) {
            self.prev_period = Some(period_reg);
            out.push(RegisterWrite { address: 0x400E, value: period_reg });
        }
    }

    fn push_vol(&mut self, out: &mut RegisterWriteQueue, value: u8) {
        if self.prev_vol != Some(value) {
            self.prev_vol = Some(value);
            out.push(RegisterWrite { address: 0x400C, value });
        }
    }

    pub fn stop_playback(&mut self, out: &mut RegisterWriteQueue) {
        self.cursor.cut();
        self.push_vol(out, 0x30);
    }
}

impl Default for NoiseDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// DPCM channel: a minimal driver that writes only the direct PCM
/// amplitude register, `$4011`, on a volume event and on note-cut
/// (spec.md §4.2; grounded on `Apu2DpcmDriver` in
/// `audio/synth/nes_2a03_driver.cpp`). No sample playback, addressing, or
/// IRQ/DMA timing model (spec.md §5 non-goal).
pub struct DpcmDriver {
    cursor: ChannelCursor,
}

impl DpcmDriver {
    pub fn new() -> Self {
        Self {
            cursor: ChannelCursor::default(),
        }
    }

    pub fn tick(&mut self, ev: Option<&RowEvent>, doc: &Document, out: &mut RegisterWriteQueue) {
        let Some(ev) = ev else { return };
        self.cursor.apply_event(ev, &doc.instruments);

        if ev.note.is_some_and(|n| n.is_cut()) {
            out.push(RegisterWrite { address: 0x4011, value: 0 });
            return;
        }

        if let Some(volume) = ev.volume {
            out.push(RegisterWrite { address: 0x4011, value: volume });
        }
    }

    pub fn stop_playback(&mut self, out: &mut RegisterWriteQueue) {
        self.cursor.cut();
        out.push(RegisterWrite { address: 0x4011, value: 0 });
    }
}

impl Default for DpcmDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// One chip slot's worth of channel drivers. `Apu1` holds two pulse
/// drivers; `Apu2` holds triangle/noise/DPCM.
pub enum ChipDriver {
    Apu1([PulseDriver; 2]),
    Apu2(Box<(TriangleDriver, NoiseDriver, DpcmDriver)>),
}

impl ChipDriver {
    pub fn new(kind: ChipKind, frequency_table: &[f64]) -> Self {
        match kind {
            ChipKind::Apu1 => ChipDriver::Apu1([
                PulseDriver::new(0, frequency_table),
                PulseDriver::new(1, frequency_table),
            ]),
            ChipKind::Apu2 => ChipDriver::Apu2(Box::new((
                TriangleDriver::new(frequency_table),
                NoiseDriver::new(),
                DpcmDriver::new(),
            ))),
        }
    }

    pub fn num_channels(&self) -> usize {
        match self {
            ChipDriver::Apu1(_) => 2,
            ChipDriver::Apu2(_) => 3,
        }
    }

    pub fn tick_channel(
        &mut self,
        channel: usize,
        ev: Option<&RowEvent>,
        doc: &Document,
        out: &mut RegisterWriteQueue,
    ) {
        match self {
            ChipDriver::Apu1(pulses) => pulses[channel].tick(ev, doc, out),
            ChipDriver::Apu2(rest) => match channel {
                0 => rest.0.tick(ev, doc, out),
                1 => rest.1.tick(ev, doc, out),
                2 => rest.2.tick(ev, doc, out),
                _ => unreachable!("Apu2 only has 3 channels"),
            },
        }
    }

    pub fn stop_playback(&mut self, out: &mut RegisterWriteQueue) {
        match self {
            ChipDriver::Apu1(pulses) => {
                for pulse in pulses {
                    pulse.stop_playback(out);
                }
            }
            ChipDriver::Apu2(rest) => {
                rest.0.stop_playback(out);
                rest.1.stop_playback(out);
                rest.2.stop_playback(out);
            }
        }
    }
}
