use super::traits::{invalid, ConfigSection};
use crate::error::MelodyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Knobs of the fitness function. Frozen for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    // Soft score weights
    pub w_chord: f64,
    pub w_scale: f64,
    pub w_movement: f64,
    pub w_syncopation: f64,
    pub w_motif: f64,
    pub w_contour: f64,
    pub w_density: f64,

    // Hard penalties: harmony, range, structure
    pub pen_measure_start_off_chord: f64,
    pub pen_out_of_range: f64,
    pub pen_excess_attacks: f64,

    // Ending
    pub pen_poor_final_measure: f64,
    pub pen_missing_final_note: f64,
    pub pen_final_note_off_chord: f64,

    // Rest/hold density
    pub rest_ratio_target: f64,
    pub rest_ratio_tolerance: f64,
    pub pen_rest_ratio: f64,
    pub hold_ratio_max: f64,
    pub pen_hold_ratio: f64,

    // Sparse measures
    pub min_attacks_per_measure: usize,
    pub pen_poor_measure: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            w_chord: 0.22,
            w_scale: 0.16,
            w_movement: 0.18,
            w_syncopation: 0.14,
            w_motif: 0.16,
            w_contour: 0.10,
            w_density: 0.04,
            pen_measure_start_off_chord: 7.0,
            pen_out_of_range: 3.0,
            pen_excess_attacks: 2.0,
            pen_poor_final_measure: 12.0,
            pen_missing_final_note: 10.0,
            pen_final_note_off_chord: 6.0,
            rest_ratio_target: 0.18,
            rest_ratio_tolerance: 0.12,
            pen_rest_ratio: 18.0,
            hold_ratio_max: 0.40,
            pen_hold_ratio: 22.0,
            min_attacks_per_measure: 2,
            pen_poor_measure: 3.0,
        }
    }
}

impl FitnessWeights {
    /// Resolved values keyed by field name, for preset files.
    pub fn to_flat_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        let entries = [
            ("w_chord", self.w_chord),
            ("w_scale", self.w_scale),
            ("w_movement", self.w_movement),
            ("w_syncopation", self.w_syncopation),
            ("w_motif", self.w_motif),
            ("w_contour", self.w_contour),
            ("w_density", self.w_density),
            ("pen_measure_start_off_chord", self.pen_measure_start_off_chord),
            ("pen_out_of_range", self.pen_out_of_range),
            ("pen_excess_attacks", self.pen_excess_attacks),
            ("pen_poor_final_measure", self.pen_poor_final_measure),
            ("pen_missing_final_note", self.pen_missing_final_note),
            ("pen_final_note_off_chord", self.pen_final_note_off_chord),
            ("rest_ratio_target", self.rest_ratio_target),
            ("rest_ratio_tolerance", self.rest_ratio_tolerance),
            ("pen_rest_ratio", self.pen_rest_ratio),
            ("hold_ratio_max", self.hold_ratio_max),
            ("pen_hold_ratio", self.pen_hold_ratio),
            ("min_attacks_per_measure", self.min_attacks_per_measure as f64),
            ("pen_poor_measure", self.pen_poor_measure),
        ];
        for (key, value) in entries {
            map.insert(key.to_string(), value);
        }
        map
    }
}

impl ConfigSection for FitnessWeights {
    fn section_name() -> &'static str {
        "fitness"
    }

    fn validate(&self) -> Result<(), MelodyError> {
        let section = Self::section_name();
        if self.to_flat_map().values().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid(section, "Weights and penalties must be finite and non-negative"));
        }
        if self.hold_ratio_max >= 1.0 {
            return Err(invalid(section, "hold_ratio_max must be below 1"));
        }
        if self.rest_ratio_target > 1.0 {
            return Err(invalid(section, "rest_ratio_target must be within [0, 1]"));
        }
        Ok(())
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Five user-facing 0-100 controls that map onto fitness weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderSettings {
    pub consonance: u8,
    pub smoothness: u8,
    pub syncopation: u8,
    pub repetition: u8,
    pub space: u8,
}

impl Default for SliderSettings {
    fn default() -> Self {
        Self {
            consonance: 55,
            smoothness: 55,
            syncopation: 45,
            repetition: 55,
            space: 45,
        }
    }
}

impl SliderSettings {
    /// Linear mapping onto weight ranges; fields without a slider keep defaults.
    pub fn to_weights(&self) -> FitnessWeights {
        self.apply(FitnessWeights::default())
    }

    /// Same mapping on top of `base`; fields without a slider keep `base`.
    pub fn apply(&self, base: FitnessWeights) -> FitnessWeights {
        let t = |v: u8| f64::from(v.min(100)) / 100.0;
        let consonance = t(self.consonance);

        FitnessWeights {
            w_chord: lerp(0.12, 0.38, consonance),
            // More consonance leaves less room for passing scale tones
            w_scale: lerp(0.22, 0.10, consonance),
            w_movement: lerp(0.10, 0.32, t(self.smoothness)),
            w_syncopation: lerp(0.05, 0.26, t(self.syncopation)),
            w_motif: lerp(0.05, 0.28, t(self.repetition)),
            rest_ratio_target: lerp(0.08, 0.35, t(self.space)),
            ..base
        }
    }

    /// Raw slider values keyed for preset files.
    pub fn to_flat_map(&self) -> BTreeMap<String, f64> {
        [
            ("consonance_0_100", self.consonance),
            ("smoothness_0_100", self.smoothness),
            ("syncopation_0_100", self.syncopation),
            ("repetition_0_100", self.repetition),
            ("space_0_100", self.space),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), f64::from(v)))
        .collect()
    }
}
