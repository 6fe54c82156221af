use super::chord::chord_pitch_classes;
use super::pitch::PitchClassSet;
use super::scale::{scale_pitch_classes, Mode};
use crate::config::music::{normalize_progression, MusicConfig};
use crate::error::{MelodyError, Result};

/// Scale and per-measure chord pitch classes for one run.
///
/// Built once from the frozen music configuration and shared read-only by the
/// evaluator and the mutation operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TonalContext {
    scale: PitchClassSet,
    chords: Vec<PitchClassSet>,
}

impl TonalContext {
    pub fn new(tonic: &str, mode: Mode, progression: &[String], measures: usize) -> Result<Self> {
        let scale = scale_pitch_classes(tonic, mode)?;

        let progression = normalize_progression(progression, measures);
        if progression.is_empty() {
            return Err(MelodyError::Configuration(
                "Chord progression must contain at least one chord".to_string(),
            ));
        }

        let chords = progression
            .iter()
            .map(|symbol| chord_pitch_classes(symbol))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { scale, chords })
    }

    pub fn from_config(music: &MusicConfig) -> Result<Self> {
        let mode: Mode = music.mode.parse()?;
        Self::new(&music.tonic, mode, &music.chords, music.measures)
    }

    pub fn scale(&self) -> PitchClassSet {
        self.scale
    }

    /// Chord of `measure`; measures past the progression reuse its last chord.
    pub fn chord(&self, measure: usize) -> PitchClassSet {
        self.chords[measure.min(self.chords.len() - 1)]
    }

    pub fn final_chord(&self) -> PitchClassSet {
        self.chords[self.chords.len() - 1]
    }

    pub fn num_chords(&self) -> usize {
        self.chords.len()
    }

    pub fn is_chord_tone(&self, pitch: u8, measure: usize) -> bool {
        self.chord(measure).contains_pitch(pitch)
    }

    pub fn is_scale_tone(&self, pitch: u8) -> bool {
        self.scale.contains_pitch(pitch)
    }
}
