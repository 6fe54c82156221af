use serde::{Deserialize, Serialize};

/// Musical frame recovered from an external score.
///
/// Every field is optional except the progression; absent fields leave the
/// run configuration untouched when the score is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportedScore {
    pub bpm: Option<u32>,
    pub time_signature: Option<String>,
    pub tonic: Option<String>,
    pub mode: Option<String>,        // "mayor" or "menor"
    pub chords: Vec<String>,         // One symbol per requested measure
    pub measures_detected: usize,
}

/// A note with absolute start and end in file ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSpan {
    pub key: u8,
    pub start: u64,
    pub end: u64,
}

impl NoteSpan {
    /// Ticks of this note that fall inside `[from, to)`.
    pub fn overlap(&self, from: u64, to: u64) -> u64 {
        self.end.min(to).saturating_sub(self.start.max(from))
    }
}
