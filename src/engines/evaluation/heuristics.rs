use super::curves::{climax_curve, motif_curve, syncopation_curve, triangular};
use super::evaluator::{FitnessEvaluator, MelodyAnalysis};
use crate::config::FitnessWeights;

/// Subdivisions that fall on a beat in the 8-per-measure grid.
const ON_BEAT_SUBDIVISIONS: [usize; 4] = [0, 2, 4, 6];

/// Soft sub-scores, each normalised to [0, 1].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoftScores {
    pub chord: f64,
    pub scale: f64,
    pub movement: f64,
    pub syncopation: f64,
    pub motif: f64,
    pub contour: f64,
    pub density: f64,
}

impl SoftScores {
    pub fn weighted(&self, w: &FitnessWeights) -> f64 {
        w.w_chord * self.chord
            + w.w_scale * self.scale
            + w.w_movement * self.movement
            + w.w_syncopation * self.syncopation
            + w.w_motif * self.motif
            + w.w_contour * self.contour
            + w.w_density * self.density
    }
}

/// Score of one melodic step and whether it counts as a leap.
fn interval_score(interval: u8) -> (f64, bool) {
    match interval {
        0..=4 => (1.0, false),
        5..=7 => (0.6, false),
        8..=9 => (0.15, true),
        _ => (-0.35, true),
    }
}

impl FitnessEvaluator<'_> {
    pub(super) fn soft_scores(&self, analysis: &MelodyAnalysis<'_>) -> SoftScores {
        let (chord, scale) = self.harmony_scores(analysis);
        SoftScores {
            chord,
            scale,
            movement: movement_score(&analysis.sounding),
            syncopation: self.syncopation_score(analysis),
            motif: self.motif_score(analysis),
            contour: self.contour_score(analysis),
            density: density_score(&analysis.attacks_per_measure),
        }
    }

    /// Chord and scale conformity of every sounding tick.
    fn harmony_scores(&self, analysis: &MelodyAnalysis<'_>) -> (f64, f64) {
        let mut chord = 0.0;
        let mut scale = 0.0;
        let mut events = 0usize;

        for (i, pitch) in analysis.sounding.iter().enumerate() {
            let Some(pitch) = *pitch else { continue };
            let measure = self.layout.measure_of(i);

            if self.tonal.is_chord_tone(pitch, measure) {
                chord += 1.0;
                scale += 1.0;
            } else if self.tonal.is_scale_tone(pitch) {
                chord += 0.25;
                scale += 0.65;
            } else {
                scale -= 0.5;
            }
            events += 1;
        }

        if events == 0 {
            return (0.0, 0.0);
        }
        let n = events as f64;
        (
            (chord / n).clamp(0.0, 1.0),
            ((scale / n + 0.5) / 1.5).clamp(0.0, 1.0),
        )
    }

    fn syncopation_score(&self, analysis: &MelodyAnalysis<'_>) -> f64 {
        let mut on_beat = 0usize;
        let mut total = 0usize;
        for (i, tick) in analysis.ticks.iter().enumerate() {
            if tick.is_attack() {
                if ON_BEAT_SUBDIVISIONS.contains(&self.layout.subdivision_of(i)) {
                    on_beat += 1;
                }
                total += 1;
            }
        }

        if total == 0 {
            return 0.0;
        }
        syncopation_curve((total - on_beat) as f64 / total as f64)
    }

    /// Rewards a few literally repeated measures.
    fn motif_score(&self, analysis: &MelodyAnalysis<'_>) -> f64 {
        let measures: Vec<_> = (0..self.layout.measures)
            .map(|m| &analysis.ticks[self.layout.measure_span(m)])
            .collect();

        let mut identical = 0usize;
        for i in 0..measures.len() {
            for j in (i + 1)..measures.len() {
                if measures[i] == measures[j] {
                    identical += 1;
                }
            }
        }
        motif_curve(identical)
    }

    /// Ambitus near a ninth with the climax late in the phrase.
    fn contour_score(&self, analysis: &MelodyAnalysis<'_>) -> f64 {
        let pitches: Vec<u8> = analysis.ticks.iter().filter_map(|t| t.pitch()).collect();
        if pitches.len() < 2 {
            return 0.0;
        }

        let (Some(&lowest), Some(&highest)) = (pitches.iter().min(), pitches.iter().max()) else {
            return 0.0;
        };
        let range_score = triangular(f64::from(highest - lowest), 4.0, 9.0, 14.0);

        let climax_tick = analysis
            .ticks
            .iter()
            .position(|t| t.pitch() == Some(highest))
            .unwrap_or(0);
        let climax_score = climax_curve(self.layout.measure_of(climax_tick));

        0.6 * range_score + 0.4 * climax_score
    }
}

/// Stepwise motion scores best; repeated leaps are punished.
fn movement_score(sounding: &[Option<u8>]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;
    let mut consecutive_leaps = 0usize;
    let mut prev: Option<u8> = None;

    for pitch in sounding.iter().flatten() {
        let Some(last) = prev.replace(*pitch) else { continue };

        let (score, leap) = interval_score(pitch.abs_diff(last));
        total += score;
        consecutive_leaps = if leap { consecutive_leaps + 1 } else { 0 };
        if consecutive_leaps >= 2 {
            total -= 1.0;
        }
        pairs += 1;
    }

    if pairs == 0 {
        return 0.0;
    }
    ((total / pairs as f64 + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Mean closeness of each measure's attack count to four.
fn density_score(attacks_per_measure: &[usize]) -> f64 {
    if attacks_per_measure.is_empty() {
        return 0.0;
    }
    let sum: f64 = attacks_per_measure
        .iter()
        .map(|a| triangular(*a as f64, 1.5, 4.0, 6.5))
        .sum();
    sum / attacks_per_measure.len() as f64
}
