//! Swap-based edit commands (C8): every edit owns a replacement value that
//! gets swapped into the live document. Applying the same command twice is
//! therefore its own inverse — that's how undo/redo work without a
//! separate "undo" implementation per command.
//!
//! Grounded on `edit/pattern.h`/`.cpp` in the original implementation.

use crate::doc::{erase_empty, Document, Kv, RowEvent, TimeInPattern};

/// Implemented by every edit command. `apply` both performs the edit *and*
/// rewrites itself into its own inverse, so calling `apply` again undoes it.
pub trait EditCommand: Send {
    fn apply(&mut self, doc: &mut Document);
}

/// A boxed, type-erased edit command, as stored in [`crate::edit::History`]
/// and passed across the command queue.
pub type EditBox = Box<dyn EditCommand>;

/// Replace the [`RowEvent`] at one `(chip, channel, grid, time)` coordinate
/// with `replacement`, swapping the previous value back in on the next
/// `apply`.
pub struct PatternEdit {
    chip: usize,
    channel: usize,
    grid: usize,
    time: TimeInPattern,
    replacement: RowEvent,
}

impl PatternEdit {
    fn new(chip: usize, channel: usize, grid: usize, time: TimeInPattern, replacement: RowEvent) -> Self {
        Self {
            chip,
            channel,
            grid,
            time,
            replacement,
        }
    }

    /// Build a command that removes whatever is at `time`, replacing it
    /// with an empty `RowEvent`. Applying it again restores the removed
    /// event.
    pub fn delete_cell(chip: usize, channel: usize, grid: usize, time: TimeInPattern) -> Self {
        Self::new(chip, channel, grid, time, RowEvent::default())
    }

    /// Build a command that writes `event` at `time`, clobbering (and, on
    /// undo, restoring) whatever was already there.
    pub fn insert_note(chip: usize, channel: usize, grid: usize, time: TimeInPattern, event: RowEvent) -> Self {
        Self::new(chip, channel, grid, time, event)
    }

    fn block<'a>(&self, doc: &'a mut Document) -> Option<&'a mut crate::doc::TimelineBlock> {
        let time = self.time;
        doc.timelines
            .get_mut(self.chip)?
            .get_mut(self.channel)?
            .get_mut(self.grid)?
            .blocks
            .iter_mut()
            .find(|b| time.anchor_beat >= num_rational::Ratio::from(b.begin_time))
    }
}

impl EditCommand for PatternEdit {
    fn apply(&mut self, doc: &mut Document) {
        let Some(block) = self.block(doc) else { return };

        let mut kv = Kv::new(&mut block.pattern.events);
        std::mem::swap(kv.get_or_insert(self.time), &mut self.replacement);

        // `get_or_insert` may have created a fresh slot that the swap just
        // emptied back out (undoing an insert); drop it so the document
        // compares equal to the pre-edit snapshot rather than keeping a
        // stray empty `RowEvent` around.
        erase_empty(&mut block.pattern.events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{Document, GridCell, Note, Pattern, TimelineBlock, TimelineCell};
    use num_rational::Ratio;

    fn doc_with_note(note: i16, at: TimeInPattern) -> Document {
        let mut doc = Document::empty();
        doc.grid_cells.push(GridCell { nbeats: Ratio::new(4, 1) });
        let mut ev = RowEvent::default();
        ev.note = Some(Note(note));
        let events = vec![crate::doc::TimedRowEvent::new(at, ev)];
        let cell = TimelineCell::new(vec![TimelineBlock::new(0, None, Pattern::new(events))]);
        doc.timelines[0][0].push(cell);
        doc
    }

    #[test]
    fn delete_then_reapply_restores_note() {
        let at = TimeInPattern::new(Ratio::new(0, 1), 0);
        let mut doc = doc_with_note(69, at);
        let original = doc.clone();

        let mut edit = PatternEdit::delete_cell(0, 0, 0, at);
        edit.apply(&mut doc);
        assert_eq!(doc.timelines[0][0][0].blocks[0].pattern.events.len(), 0);

        edit.apply(&mut doc);
        assert_eq!(
            doc.timelines[0][0][0].blocks[0].pattern.events[0].v.note,
            Some(Note(69))
        );
        assert_eq!(doc, original, "reapplying the delete's inverse must restore the exact original snapshot");
    }

    #[test]
    fn insert_note_into_empty_cell_then_undo_removes_it() {
        let at = TimeInPattern::new(Ratio::new(0, 1), 0);
        let mut doc = Document::empty();
        doc.grid_cells.push(GridCell { nbeats: Ratio::new(4, 1) });
        let cell = TimelineCell::new(vec![TimelineBlock::new(0, None, Pattern::default())]);
        doc.timelines[0][0].push(cell);
        let original = doc.clone();

        let mut ev = RowEvent::default();
        ev.note = Some(Note(72));
        let mut edit = PatternEdit::insert_note(0, 0, 0, at, ev);
        edit.apply(&mut doc);
        assert_eq!(doc.timelines[0][0][0].blocks[0].pattern.events.len(), 1);
        assert_eq!(
            doc.timelines[0][0][0].blocks[0].pattern.events[0].v.note,
            Some(Note(72))
        );

        edit.apply(&mut doc);
        assert_eq!(doc.timelines[0][0][0].blocks[0].pattern.events.len(), 0);
        assert_eq!(doc, original, "undo must restore the exact original snapshot");
    }
}
