use super::heuristics::SoftScores;
use super::penalties::PenaltyReport;
use crate::config::FitnessWeights;
use crate::engines::tonal::TonalContext;
use crate::error::{MelodyError, Result};
use crate::types::{sounding_pitch, GridLayout, PitchRange, Tick};

/// Score of a melody with every term exposed.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessBreakdown {
    pub penalties: PenaltyReport,
    pub soft: SoftScores,
    /// Weighted sum of the soft sub-scores, before scaling to 0-100.
    pub soft_weighted: f64,
}

impl FitnessBreakdown {
    pub fn total(&self) -> f64 {
        100.0 - self.penalties.total() + 100.0 * self.soft_weighted
    }
}

/// Per-melody facts shared by the penalty and heuristic passes.
pub(super) struct MelodyAnalysis<'t> {
    pub ticks: &'t [Tick],
    pub sounding: Vec<Option<u8>>,
    pub attacks_per_measure: Vec<usize>,
}

/// Pure scoring function over melodies of one configured shape.
pub struct FitnessEvaluator<'a> {
    pub(super) layout: GridLayout,
    pub(super) range: PitchRange,
    pub(super) tonal: &'a TonalContext,
    pub(super) weights: &'a FitnessWeights,
}

impl<'a> FitnessEvaluator<'a> {
    pub fn new(
        layout: GridLayout,
        range: PitchRange,
        tonal: &'a TonalContext,
        weights: &'a FitnessWeights,
    ) -> Self {
        Self {
            layout,
            range,
            tonal,
            weights,
        }
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    /// Scalar fitness. Fails if the melody does not have the configured length.
    pub fn score(&self, ticks: &[Tick]) -> Result<f64> {
        Ok(self.breakdown(ticks)?.total())
    }

    pub fn breakdown(&self, ticks: &[Tick]) -> Result<FitnessBreakdown> {
        if ticks.len() != self.layout.len() {
            return Err(MelodyError::Validation(format!(
                "Invalid melody length: {} != {}",
                ticks.len(),
                self.layout.len()
            )));
        }

        let analysis = self.analyse(ticks);
        let penalties = self.hard_penalties(&analysis);
        let soft = self.soft_scores(&analysis);
        let soft_weighted = soft.weighted(self.weights);

        Ok(FitnessBreakdown {
            penalties,
            soft,
            soft_weighted,
        })
    }

    fn analyse<'t>(&self, ticks: &'t [Tick]) -> MelodyAnalysis<'t> {
        let sounding = (0..ticks.len()).map(|i| sounding_pitch(ticks, i)).collect();
        let attacks_per_measure = (0..self.layout.measures)
            .map(|m| {
                ticks[self.layout.measure_span(m)]
                    .iter()
                    .filter(|t| t.is_attack())
                    .count()
            })
            .collect();

        MelodyAnalysis {
            ticks,
            sounding,
            attacks_per_measure,
        }
    }
}
