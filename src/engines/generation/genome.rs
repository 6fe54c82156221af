//! Genome representation for the melody search
//!
//! A genome is a fixed-length sequence of ticks laid out on a measure grid.
//! Each tick is a rest, a hold of the previous pitch, or an absolute MIDI
//! pitch. The fitness of the sequence is cached next to it.
//!
//! Operators never edit a genome that already sits in a population: they
//! build a new one, so a cached fitness always belongs to the ticks it was
//! computed from. `ticks_mut` is the one way to edit in place, and it drops
//! the cached value.

use crate::engines::evaluation::FitnessEvaluator;
use crate::error::Result;
use crate::types::{GridLayout, PitchRange, Tick};
use rand::Rng;

/// Draw weights for random construction.
const RANDOM_REST_PROBABILITY: f64 = 0.10;
const RANDOM_HOLD_PROBABILITY: f64 = 0.15;

#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    ticks: Vec<Tick>,
    fitness: Option<f64>,
}

/// How many ticks of each kind a melody holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickCounts {
    pub notes: usize,
    pub rests: usize,
    pub holds: usize,
}

impl Genome {
    pub fn new(ticks: Vec<Tick>) -> Self {
        Self { ticks, fitness: None }
    }

    /// Independent draw per tick: rest 10 %, hold 15 %, in-range pitch 75 %.
    pub fn random<R: Rng>(layout: GridLayout, range: PitchRange, rng: &mut R) -> Self {
        let mut ticks = Vec::with_capacity(layout.len());
        for _ in 0..layout.len() {
            let r = rng.gen::<f64>();
            let tick = if r < RANDOM_REST_PROBABILITY {
                Tick::Rest
            } else if r < RANDOM_REST_PROBABILITY + RANDOM_HOLD_PROBABILITY {
                Tick::Hold
            } else {
                Tick::Pitch(range.sample(rng))
            };
            ticks.push(tick);
        }
        Self::new(ticks)
    }

    /// Decode boundary integer codes.
    pub fn from_codes(codes: &[i32]) -> Result<Self> {
        let ticks = codes
            .iter()
            .map(|c| Tick::from_code(*c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(ticks))
    }

    pub fn to_codes(&self) -> Vec<i32> {
        self.ticks.iter().map(|t| t.code()).collect()
    }

    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    /// Mutable access to the ticks. Invalidates the cached fitness.
    pub fn ticks_mut(&mut self) -> &mut [Tick] {
        self.fitness = None;
        &mut self.ticks
    }

    pub fn into_ticks(self) -> Vec<Tick> {
        self.ticks
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Fitness for ranking; unevaluated genomes rank last.
    pub fn rank_fitness(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Score the ticks and cache the result.
    pub fn evaluate(&mut self, evaluator: &FitnessEvaluator<'_>) -> Result<f64> {
        let fitness = evaluator.score(&self.ticks)?;
        self.fitness = Some(fitness);
        Ok(fitness)
    }

    #[cfg(test)]
    pub(crate) fn with_fitness(mut self, fitness: f64) -> Self {
        self.fitness = Some(fitness);
        self
    }

    pub fn counts(&self) -> TickCounts {
        let mut counts = TickCounts::default();
        for tick in &self.ticks {
            match tick {
                Tick::Pitch(_) => counts.notes += 1,
                Tick::Rest => counts.rests += 1,
                Tick::Hold => counts.holds += 1,
            }
        }
        counts
    }
}
