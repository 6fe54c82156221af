use crate::error::{MelodyError, Result};
use serde::{Deserialize, Serialize};

/// Chromatic pitch names accepted for tonics and chord roots.
const PITCH_NAMES: [(&str, u8); 17] = [
    ("C", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
];

/// Canonical spelling per pitch class, sharps preferred.
pub const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Canonical spelling per pitch class, flats preferred.
pub const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Map a note name such as "F#" or "Bb" to its pitch class.
pub fn pitch_class_of(name: &str) -> Result<u8> {
    let name = name.trim();
    PITCH_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, pc)| *pc)
        .ok_or_else(|| MelodyError::Configuration(format!("Unsupported pitch name: '{}'", name)))
}

/// A subset of the twelve pitch classes, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, pitch_class: u8) {
        self.0 |= 1 << (pitch_class % 12);
    }

    pub fn contains_class(&self, pitch_class: u8) -> bool {
        pitch_class < 12 && self.0 & (1 << pitch_class) != 0
    }

    /// Membership of an absolute pitch by its pitch class.
    pub fn contains_pitch(&self, pitch: u8) -> bool {
        self.contains_class(pitch % 12)
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Pitch classes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..12u8).filter(move |pc| self.contains_class(*pc))
    }
}

impl FromIterator<u8> for PitchClassSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = PitchClassSet::empty();
        for pc in iter {
            set.insert(pc);
        }
        set
    }
}
