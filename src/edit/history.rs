//! Undo/redo history (C8): two stacks of swap-commands, plus the cursor
//! position to restore alongside each one.
//!
//! Grounded on the `History`/`UndoFrame` shapes exercised in
//! `tests/test_edit_history.cpp` in the original implementation. Unlike a
//! typical text-editor undo stack, this one never merges consecutive
//! edits — every `push` is a standalone frame, by design (spec.md §8).

use crate::doc::Document;

use super::pattern::EditBox;

/// Where the edit cursor was (or should move to) alongside one undo frame.
/// Opaque to this module; the GUI decides what a cursor position means.
pub type CursorPos = (usize, usize);

struct UndoFrame {
    command: EditBox,
    before_cursor: CursorPos,
    after_cursor: CursorPos,
}

/// Linear undo/redo history. `push` always clears the redo stack, matching
/// every mainstream editor's "new edit abandons redo" behavior.
#[derive(Default)]
pub struct History {
    undo_stack: Vec<UndoFrame>,
    redo_stack: Vec<UndoFrame>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `command` to `doc`, recording it (with the cursor positions
    /// before/after) as the newest undo frame.
    pub fn push(&mut self, doc: &mut Document, mut command: EditBox, before_cursor: CursorPos, after_cursor: CursorPos) {
        command.apply(doc);
        self.redo_stack.clear();
        self.undo_stack.push(UndoFrame {
            command,
            before_cursor,
            after_cursor,
        });
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo the most recent edit, returning the cursor position to restore.
    pub fn undo(&mut self, doc: &mut Document) -> Option<CursorPos> {
        let mut frame = self.undo_stack.pop()?;
        frame.command.apply(doc);
        let cursor = frame.before_cursor;
        self.redo_stack.push(frame);
        Some(cursor)
    }

    /// Redo the most recently undone edit, returning the cursor position
    /// to restore.
    pub fn redo(&mut self, doc: &mut Document) -> Option<CursorPos> {
        let mut frame = self.redo_stack.pop()?;
        frame.command.apply(doc);
        let cursor = frame.after_cursor;
        self.undo_stack.push(frame);
        Some(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{Document, GridCell, Note, Pattern, RowEvent, TimeInPattern, TimelineBlock, TimelineCell};
    use crate::edit::pattern::PatternEdit;
    use num_rational::Ratio;

    fn doc_with_empty_cell() -> Document {
        let mut doc = Document::empty();
        doc.grid_cells.push(GridCell { nbeats: Ratio::new(4, 1) });
        let cell = TimelineCell::new(vec![TimelineBlock::new(0, None, Pattern::default())]);
        doc.timelines[0][0].push(cell);
        doc
    }

    #[test]
    fn undo_reverts_exactly_one_edit() {
        let mut doc = doc_with_empty_cell();
        let mut history = History::new();
        let at = TimeInPattern::new(Ratio::new(0, 1), 0);

        let mut ev = RowEvent::default();
        ev.note = Some(Note(60));
        history.push(
            &mut doc,
            Box::new(PatternEdit::insert_note(0, 0, 0, at, ev)),
            (0, 0),
            (0, 1),
        );
        assert_eq!(doc.timelines[0][0][0].blocks[0].pattern.events[0].v.note, Some(Note(60)));

        let cursor = history.undo(&mut doc).unwrap();
        assert_eq!(cursor, (0, 0));
        assert_eq!(doc, doc_with_empty_cell(), "undo must restore the exact original snapshot");
    }

    #[test]
    fn redo_reapplies_undone_edit() {
        let mut doc = doc_with_empty_cell();
        let mut history = History::new();
        let at = TimeInPattern::new(Ratio::new(0, 1), 0);
        let mut ev = RowEvent::default();
        ev.note = Some(Note(60));
        history.push(&mut doc, Box::new(PatternEdit::insert_note(0, 0, 0, at, ev)), (0, 0), (0, 1));
        history.undo(&mut doc);

        let cursor = history.redo(&mut doc).unwrap();
        assert_eq!(cursor, (0, 1));
        assert_eq!(doc.timelines[0][0][0].blocks[0].pattern.events[0].v.note, Some(Note(60)));
    }

    #[test]
    fn push_clears_redo_stack() {
        let mut doc = doc_with_empty_cell();
        let mut history = History::new();
        let at = TimeInPattern::new(Ratio::new(0, 1), 0);
        let mut ev = RowEvent::default();
        ev.note = Some(Note(60));
        history.push(&mut doc, Box::new(PatternEdit::insert_note(0, 0, 0, at, ev)), (0, 0), (0, 1));
        history.undo(&mut doc);
        assert!(history.can_redo());

        let mut ev2 = RowEvent::default();
        ev2.note = Some(Note(64));
        history.push(&mut doc, Box::new(PatternEdit::insert_note(0, 0, 0, at, ev2)), (0, 0), (0, 1));
        assert!(!history.can_redo());
    }

    #[test]
    fn consecutive_edits_do_not_merge() {
        let mut doc = doc_with_empty_cell();
        let mut history = History::new();
        let at = TimeInPattern::new(Ratio::new(0, 1), 0);

        let mut ev1 = RowEvent::default();
        ev1.note = Some(Note(60));
        history.push(&mut doc, Box::new(PatternEdit::insert_note(0, 0, 0, at, ev1)), (0, 0), (0, 1));

        let mut ev2 = RowEvent::default();
        ev2.volume = Some(10);
        history.push(&mut doc, Box::new(PatternEdit::insert_note(0, 0, 0, at, ev2)), (0, 1), (0, 2));

        assert_eq!(history.undo_stack.len(), 2);
        history.undo(&mut doc);
        // Only the second edit is undone: volume edit reverted, note stays.
        assert_eq!(doc.timelines[0][0][0].blocks[0].pattern.events[0].v.note, Some(Note(60)));
    }
}
