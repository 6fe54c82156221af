use super::pitch::{pitch_class_of, PitchClassSet};
use crate::error::{MelodyError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordQuality {
    Major,
    Minor,
}

impl ChordQuality {
    /// Semitone offsets of the triad from its root.
    pub fn intervals(self) -> [u8; 3] {
        match self {
            ChordQuality::Major => [0, 4, 7],
            ChordQuality::Minor => [0, 3, 7],
        }
    }
}

/// A parsed triad symbol such as "Am" or "F#"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordSymbol {
    pub root: String,
    pub root_class: u8,
    pub quality: ChordQuality,
}

impl ChordSymbol {
    /// Parse `<root><suffix>`: a trailing "m" marks a minor triad, a trailing
    /// "maj" or no suffix a major one.
    pub fn parse(symbol: &str) -> Result<Self> {
        let s = symbol.trim();
        if s.is_empty() {
            return Err(MelodyError::Configuration("Empty chord symbol".to_string()));
        }

        let (root, quality) = if let Some(root) = s.strip_suffix("maj") {
            (root, ChordQuality::Major)
        } else if let Some(root) = s.strip_suffix('m') {
            (root, ChordQuality::Minor)
        } else {
            (s, ChordQuality::Major)
        };

        let root_class = pitch_class_of(root).map_err(|_| {
            MelodyError::Configuration(format!("Unknown root in chord symbol '{}'", symbol))
        })?;

        Ok(Self {
            root: root.to_string(),
            root_class,
            quality,
        })
    }

    pub fn pitch_classes(&self) -> PitchClassSet {
        self.quality
            .intervals()
            .iter()
            .map(|i| (self.root_class + i) % 12)
            .collect()
    }
}

/// Pitch classes of the triad named by `symbol`.
pub fn chord_pitch_classes(symbol: &str) -> Result<PitchClassSet> {
    Ok(ChordSymbol::parse(symbol)?.pitch_classes())
}
