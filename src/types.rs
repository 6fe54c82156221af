use crate::error::{MelodyError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeInclusive};

/// External integer code for a rest tick.
pub const REST_CODE: i32 = -1;
/// External integer code for a hold tick.
pub const HOLD_CODE: i32 = -2;

/// Highest MIDI pitch number.
pub const MAX_PITCH: u8 = 127;

/// One time slot of a melody
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tick {
    Rest,
    Hold,  // Sustain the previously sounding pitch
    Pitch(u8),
}

impl Tick {
    /// Integer code used by the import/export boundary.
    pub fn code(self) -> i32 {
        match self {
            Tick::Rest => REST_CODE,
            Tick::Hold => HOLD_CODE,
            Tick::Pitch(p) => p as i32,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            REST_CODE => Ok(Tick::Rest),
            HOLD_CODE => Ok(Tick::Hold),
            c if (0..=MAX_PITCH as i32).contains(&c) => Ok(Tick::Pitch(c as u8)),
            c => Err(MelodyError::Validation(format!(
                "Tick code {} is neither a sentinel nor a MIDI pitch",
                c
            ))),
        }
    }

    /// A numeric tick starts a new note.
    pub fn is_attack(self) -> bool {
        matches!(self, Tick::Pitch(_))
    }

    pub fn pitch(self) -> Option<u8> {
        match self {
            Tick::Pitch(p) => Some(p),
            _ => None,
        }
    }
}

/// Resolve the pitch heard at `index`.
///
/// A rest is silent, a pitch is itself, and a hold inherits the nearest
/// preceding non-hold tick. A hold chain that starts at a rest or at the
/// beginning of the melody is silent.
pub fn sounding_pitch(ticks: &[Tick], index: usize) -> Option<u8> {
    match ticks.get(index)? {
        Tick::Rest => None,
        Tick::Pitch(p) => Some(*p),
        Tick::Hold => ticks[..index]
            .iter()
            .rev()
            .find(|t| !matches!(t, Tick::Hold))
            .and_then(|t| t.pitch()),
    }
}

/// Last pitch heard in the melody, scanning backwards from the end.
pub fn last_sounding_pitch(ticks: &[Tick]) -> Option<u8> {
    (0..ticks.len()).rev().find_map(|i| sounding_pitch(ticks, i))
}

/// Measure/subdivision grid of a melody
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub measures: usize,
    pub subdivisions: usize,
}

impl GridLayout {
    pub fn new(measures: usize, subdivisions: usize) -> Self {
        Self { measures, subdivisions }
    }

    /// Total number of ticks.
    pub fn len(&self) -> usize {
        self.measures * self.subdivisions
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn measure_of(&self, tick: usize) -> usize {
        tick / self.subdivisions
    }

    pub fn subdivision_of(&self, tick: usize) -> usize {
        tick % self.subdivisions
    }

    pub fn measure_span(&self, measure: usize) -> Range<usize> {
        let start = measure * self.subdivisions;
        start..start + self.subdivisions
    }
}

/// Inclusive vocal range in MIDI pitch numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRange {
    pub min: u8,
    pub max: u8,
}

impl PitchRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, pitch: u8) -> bool {
        (self.min..=self.max).contains(&pitch)
    }

    pub fn iter(&self) -> RangeInclusive<u8> {
        self.min..=self.max
    }

    /// Uniformly random pitch in the range.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> u8 {
        rng.gen_range(self.min..=self.max)
    }
}
