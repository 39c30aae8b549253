//! Presentation Adapter: turns relay replies into transcript entries.

pub mod command;
pub mod render;
pub mod transcript;

pub use command::ClientCommand;
pub use transcript::{ChatTranscriptEntry, Origin, Sender, Transcript};
