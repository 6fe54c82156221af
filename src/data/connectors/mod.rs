mod midi;
mod types;

pub use midi::{estimate_key, MidiImporter};
pub use types::{ImportedScore, NoteSpan};
