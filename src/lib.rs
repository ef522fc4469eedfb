//! A real-time chip-music tracker engine: document model, timeline
//! iteration, per-channel chip drivers, sequencer, chip emulation/synth,
//! a lock-free GUI-to-audio command queue, and swap-based undo/redo.

pub mod audio;
pub mod cmd_queue;
pub mod doc;
pub mod edit;
pub mod error;
pub mod timing;

pub use cmd_queue::{CommandQueue, MessageBody};
pub use doc::Document;
pub use error::{DocError, DocResult};
