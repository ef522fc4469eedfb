//! Editing and undo/redo history (C8).

pub mod history;
pub mod pattern;

pub use history::{CursorPos, History};
pub use pattern::{EditBox, EditCommand, PatternEdit};
