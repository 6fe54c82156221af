use super::pitch::{pitch_class_of, PitchClassSet};
use crate::error::{MelodyError, Result};
use std::fmt;
use std::str::FromStr;

const MAJOR_STEPS: [u8; 7] = [2, 2, 1, 2, 2, 2, 1];
const NATURAL_MINOR_STEPS: [u8; 7] = [2, 1, 2, 2, 1, 2, 2];

/// Supported scale modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    NaturalMinor,
}

impl Mode {
    pub fn steps(self) -> [u8; 7] {
        match self {
            Mode::Major => MAJOR_STEPS,
            Mode::NaturalMinor => NATURAL_MINOR_STEPS,
        }
    }

    /// Name used in configuration files.
    pub fn config_name(self) -> &'static str {
        match self {
            Mode::Major => "mayor",
            Mode::NaturalMinor => "menor",
        }
    }
}

impl FromStr for Mode {
    type Err = MelodyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mayor" | "major" => Ok(Mode::Major),
            "menor" | "minor" => Ok(Mode::NaturalMinor),
            other => Err(MelodyError::Configuration(format!(
                "Mode must be 'mayor' or 'menor', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

/// Pitch classes of the seven-note scale on `tonic`.
///
/// Walks the first six step intervals of the mode from the tonic.
pub fn scale_pitch_classes(tonic: &str, mode: Mode) -> Result<PitchClassSet> {
    let root = pitch_class_of(tonic)?;
    let mut set = PitchClassSet::empty();
    set.insert(root);

    let mut acc = root;
    for step in &mode.steps()[..6] {
        acc = (acc + step) % 12;
        set.insert(acc);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_major() {
        let set = scale_pitch_classes("C", Mode::Major).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 2, 4, 5, 7, 9, 11]);
    }

    #[test]
    fn test_a_minor() {
        let mode: Mode = "menor".parse().unwrap();
        let set = scale_pitch_classes("A", mode).unwrap();
        let expected: PitchClassSet = [9u8, 11, 0, 2, 4, 5, 7].into_iter().collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_unsupported_mode() {
        assert!(matches!("dorian".parse::<Mode>(), Err(MelodyError::Configuration(_))));
    }

    #[test]
    fn test_unknown_tonic() {
        assert!(matches!(
            scale_pitch_classes("X", Mode::Major),
            Err(MelodyError::Configuration(_))
        ));
    }
}
