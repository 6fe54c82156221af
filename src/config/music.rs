use super::traits::{invalid, ConfigSection};
use crate::data::connectors::ImportedScore;
use crate::engines::tonal::{chord_pitch_classes, pitch_class_of, Mode};
use crate::error::MelodyError;
use crate::types::{GridLayout, PitchRange, MAX_PITCH};
use serde::{Deserialize, Serialize};

/// Slowest tempo whose microseconds per beat fit a 24-bit MIDI tempo event.
pub const MIN_TEMPO_BPM: u32 = 4;

/// Musical frame of a run: grid, meter, key, progression and vocal range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    pub measures: usize,
    pub subdivisions: usize,
    pub time_signature: String,
    pub tempo_bpm: u32,
    pub tonic: String,
    pub mode: String,        // "mayor" or "menor"
    pub chords: Vec<String>, // One symbol per measure
    pub range_min: u8,
    pub range_max: u8,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            measures: 8,
            subdivisions: 8,
            time_signature: "4/4".to_string(),
            tempo_bpm: 120,
            tonic: "C".to_string(),
            mode: Mode::Major.config_name().to_string(),
            chords: ["C", "G", "Am", "F", "C", "G", "F", "C"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            range_min: 60, // C4
            range_max: 72, // C5
        }
    }
}

impl MusicConfig {
    pub fn layout(&self) -> GridLayout {
        GridLayout::new(self.measures, self.subdivisions)
    }

    pub fn pitch_range(&self) -> PitchRange {
        PitchRange::new(self.range_min, self.range_max)
    }

    pub fn genome_length(&self) -> usize {
        self.layout().len()
    }

    /// Parse "N/D" into numerator and denominator.
    pub fn meter(&self) -> Result<(u8, u8), MelodyError> {
        parse_time_signature(&self.time_signature)
    }

    /// Overlay the fields present in an imported score.
    ///
    /// Absent fields keep their current values. A mode other than major or
    /// natural minor is ignored. The progression is padded or truncated to the
    /// configured number of measures.
    pub fn apply_import(&mut self, score: &ImportedScore) {
        if let Some(bpm) = score.bpm {
            self.tempo_bpm = bpm;
        }
        if let Some(meter) = &score.time_signature {
            self.time_signature = meter.clone();
        }
        if let Some(tonic) = &score.tonic {
            self.tonic = tonic.clone();
        }
        if let Some(mode) = &score.mode {
            match mode.parse::<Mode>() {
                Ok(mode) => self.mode = mode.config_name().to_string(),
                Err(_) => log::warn!("Ignoring unsupported imported mode '{}'", mode),
            }
        }
        if !score.chords.is_empty() {
            self.chords = normalize_progression(&score.chords, self.measures);
        }
    }
}

/// Pad a progression by repeating its last chord, or truncate it, so it has
/// exactly `measures` entries. An empty progression stays empty.
pub fn normalize_progression(chords: &[String], measures: usize) -> Vec<String> {
    let mut out: Vec<String> = chords.iter().take(measures).cloned().collect();
    if let Some(last) = out.last().cloned() {
        out.resize(measures, last);
    }
    out
}

pub fn parse_time_signature(value: &str) -> Result<(u8, u8), MelodyError> {
    let parse = || -> Option<(u8, u8)> {
        let (num, den) = value.trim().split_once('/')?;
        let num: u8 = num.trim().parse().ok()?;
        let den: u8 = den.trim().parse().ok()?;
        (num > 0 && den.is_power_of_two()).then_some((num, den))
    };
    parse().ok_or_else(|| MelodyError::Configuration(format!("Invalid time signature '{}'", value)))
}

impl ConfigSection for MusicConfig {
    fn section_name() -> &'static str {
        "music"
    }

    fn validate(&self) -> Result<(), MelodyError> {
        let section = Self::section_name();
        if self.measures == 0 || self.subdivisions == 0 {
            return Err(invalid(section, "Measures and subdivisions must be at least 1"));
        }
        if self.tempo_bpm < MIN_TEMPO_BPM {
            return Err(invalid(
                section,
                format!("Tempo must be at least {} BPM, got {}", MIN_TEMPO_BPM, self.tempo_bpm),
            ));
        }
        if self.range_min > self.range_max || self.range_max > MAX_PITCH {
            return Err(invalid(
                section,
                format!("Invalid vocal range {}..={}", self.range_min, self.range_max),
            ));
        }
        if self.chords.is_empty() {
            return Err(invalid(section, "Chord progression must not be empty"));
        }
        self.meter()?;
        self.mode.parse::<Mode>()?;
        pitch_class_of(&self.tonic)?;
        for symbol in &self.chords {
            chord_pitch_classes(symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(chords: &[&str]) -> ImportedScore {
        ImportedScore {
            chords: chords.iter().map(|s| s.to_string()).collect(),
            ..ImportedScore::default()
        }
    }

    #[test]
    fn test_default_is_valid() {
        let config = MusicConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.genome_length(), 64);
        assert_eq!(config.meter().unwrap(), (4, 4));
    }

    #[test]
    fn test_import_pads_short_progression() {
        let mut config = MusicConfig::default();
        config.apply_import(&score(&["Dm", "G"]));
        assert_eq!(config.chords.len(), 8);
        assert!(config.chords[2..].iter().all(|c| c == "G"));
    }

    #[test]
    fn test_import_truncates_long_progression() {
        let mut config = MusicConfig::default();
        config.measures = 2;
        config.apply_import(&score(&["Dm", "G", "C"]));
        assert_eq!(config.chords, vec!["Dm".to_string(), "G".to_string()]);
    }

    #[test]
    fn test_import_keeps_absent_fields() {
        let mut config = MusicConfig::default();
        let imported = ImportedScore {
            bpm: Some(90),
            mode: Some("lydian".to_string()),
            ..ImportedScore::default()
        };
        config.apply_import(&imported);
        assert_eq!(config.tempo_bpm, 90);
        assert_eq!(config.mode, "mayor");
        assert_eq!(config.tonic, "C");
        assert_eq!(config.chords, MusicConfig::default().chords);
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = MusicConfig::default();
        config.mode = "frigio".to_string();
        assert!(config.validate().is_err());

        let mut config = MusicConfig::default();
        config.range_min = 80;
        assert!(config.validate().is_err());

        let mut config = MusicConfig::default();
        config.time_signature = "4/3".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tempo_lower_bound() {
        let mut config = MusicConfig::default();
        config.tempo_bpm = MIN_TEMPO_BPM;
        assert!(config.validate().is_ok());

        config.tempo_bpm = MIN_TEMPO_BPM - 1;
        assert!(matches!(config.validate(), Err(MelodyError::Configuration(_))));

        config.tempo_bpm = 0;
        assert!(config.validate().is_err());
    }
}
