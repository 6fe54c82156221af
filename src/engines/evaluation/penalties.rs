use super::evaluator::{FitnessEvaluator, MelodyAnalysis};
use crate::types::{last_sounding_pitch, Tick};

/// Most attacks a measure may hold before each extra one is penalised.
pub const MAX_ATTACKS_PER_MEASURE: usize = 6;

/// Fewest attacks the final measure needs.
pub const MIN_FINAL_MEASURE_ATTACKS: usize = 2;

/// Hard constraint violations, each already multiplied by its penalty weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PenaltyReport {
    pub measure_start_off_chord: f64,
    pub out_of_range: f64,
    pub excess_attacks: f64,
    pub poor_measures: f64,
    pub poor_final_measure: f64,
    pub final_note: f64,
    pub rest_ratio: f64,
    pub hold_ratio: f64,
}

impl PenaltyReport {
    pub fn total(&self) -> f64 {
        self.measure_start_off_chord
            + self.out_of_range
            + self.excess_attacks
            + self.poor_measures
            + self.poor_final_measure
            + self.final_note
            + self.rest_ratio
            + self.hold_ratio
    }
}

/// Distance of `ratio` outside the band `target ± tolerance`, relative to the
/// room between the violated band edge and the end of [0, 1]. Zero inside.
pub fn rest_ratio_deviation(ratio: f64, target: f64, tolerance: f64) -> f64 {
    let lo = (target - tolerance).max(0.0);
    let hi = (target + tolerance).min(1.0);
    if (lo..=hi).contains(&ratio) {
        0.0
    } else if ratio < lo {
        (lo - ratio) / lo.max(1e-9)
    } else {
        (ratio - hi) / (1.0 - hi).max(1e-9)
    }
}

/// Share of the allowed headroom above `max` that `ratio` uses up.
pub fn hold_ratio_excess(ratio: f64, max: f64) -> f64 {
    if ratio > max {
        (ratio - max) / (1.0 - max)
    } else {
        0.0
    }
}

impl FitnessEvaluator<'_> {
    pub(super) fn hard_penalties(&self, analysis: &MelodyAnalysis<'_>) -> PenaltyReport {
        let w = self.weights;
        let ticks = analysis.ticks;
        let mut report = PenaltyReport::default();

        // Every measure should open on a tone of its chord
        for measure in 0..self.layout.measures {
            let start = self.layout.measure_span(measure).start;
            let on_chord = analysis.sounding[start]
                .map(|p| self.tonal.is_chord_tone(p, measure))
                .unwrap_or(false);
            if !on_chord {
                report.measure_start_off_chord += w.pen_measure_start_off_chord;
            }
        }

        let out_of_range = ticks
            .iter()
            .filter_map(|t| t.pitch())
            .filter(|p| !self.range.contains(*p))
            .count();
        report.out_of_range = out_of_range as f64 * w.pen_out_of_range;

        for &attacks in &analysis.attacks_per_measure {
            let excess = attacks.saturating_sub(MAX_ATTACKS_PER_MEASURE);
            report.excess_attacks += excess as f64 * w.pen_excess_attacks;
        }

        let poor = analysis
            .attacks_per_measure
            .iter()
            .filter(|a| **a < w.min_attacks_per_measure)
            .count();
        report.poor_measures = poor as f64 * w.pen_poor_measure;

        let final_attacks = analysis.attacks_per_measure.last().copied().unwrap_or(0);
        if final_attacks < MIN_FINAL_MEASURE_ATTACKS {
            report.poor_final_measure = w.pen_poor_final_measure;
        }

        report.final_note = match last_sounding_pitch(ticks) {
            None => w.pen_missing_final_note,
            Some(p) if !self.tonal.final_chord().contains_pitch(p) => w.pen_final_note_off_chord,
            Some(_) => 0.0,
        };

        let total = ticks.len() as f64;
        let rests = ticks.iter().filter(|t| matches!(t, Tick::Rest)).count() as f64;
        let holds = ticks.iter().filter(|t| matches!(t, Tick::Hold)).count() as f64;

        report.rest_ratio = w.pen_rest_ratio
            * rest_ratio_deviation(rests / total, w.rest_ratio_target, w.rest_ratio_tolerance);
        report.hold_ratio = w.pen_hold_ratio * hold_ratio_excess(holds / total, w.hold_ratio_max);

        report
    }
}
