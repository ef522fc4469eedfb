//! Notes have pitches. That's about it.

use serde::{Deserialize, Serialize};

/// Number of chromatic pitches in a tuning table / frequency table.
pub const CHROMATIC_COUNT: usize = 128;

/// A chromatic pitch, or one of the two sentinel values [`Note::CUT`] /
/// [`Note::RELEASE`].
///
/// Invariant: `is_valid_note() <=> 0 <= value < CHROMATIC_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Note(pub i16);

impl Note {
    pub const CUT: Note = Note(-1);
    pub const RELEASE: Note = Note(-2);

    pub fn is_cut(self) -> bool {
        self == Note::CUT
    }

    pub fn is_release(self) -> bool {
        self == Note::RELEASE
    }

    /// True if `value` is an in-bounds chromatic index, not a cut/release
    /// sentinel or any other out-of-range value.
    pub fn is_valid_note(self) -> bool {
        (0..CHROMATIC_COUNT as i16).contains(&self.0)
    }
}

impl From<i16> for Note {
    fn from(value: i16) -> Self {
        Note(value)
    }
}

/// A 2A03-style linear volume, in `0..=15`.
pub type Volume = u8;
pub const MAX_VOLUME: Volume = 15;

/// Maximum number of simultaneous effects a single row can carry.
pub const MAX_EFFECTS_PER_ROW: usize = 2;

/// One tracker effect: a 2-character name plus a byte parameter, e.g. `Qxy`
/// portamento. Unused effect slots are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub name: [u8; 2],
    pub value: u8,
}

/// The contents of one row, in one channel, at one point in time.
///
/// An empty `RowEvent` compares equal to [`RowEvent::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RowEvent {
    pub note: Option<Note>,
    pub instr: Option<u8>,
    pub volume: Option<Volume>,
    pub effects: [Option<Effect>; MAX_EFFECTS_PER_ROW],
}

impl RowEvent {
    pub fn is_empty(&self) -> bool {
        *self == RowEvent::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_note_bounds() {
        assert!(Note(0).is_valid_note());
        assert!(Note(127).is_valid_note());
        assert!(!Note(128).is_valid_note());
        assert!(!Note(-1).is_valid_note());
        assert!(!Note::CUT.is_valid_note());
        assert!(!Note::RELEASE.is_valid_note());
    }

    #[test]
    fn cut_and_release_are_distinct() {
        assert!(Note::CUT.is_cut());
        assert!(!Note::CUT.is_release());
        assert!(Note::RELEASE.is_release());
        assert!(!Note::RELEASE.is_cut());
    }

    #[test]
    fn empty_row_event_equals_default() {
        assert_eq!(RowEvent::default(), RowEvent::default());
        assert!(RowEvent::default().is_empty());

        let mut ev = RowEvent::default();
        ev.note = Some(Note(60));
        assert!(!ev.is_empty());
    }
}
