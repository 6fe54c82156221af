//! Adaptive mutation rate and stagnation tracking.
//!
//! A small state machine over (mutation rate, generations since the last
//! local improvement, generations since the last global improvement). It
//! knows nothing about genomes: the engine reports whether a generation
//! improved the best-so-far and acts on the returned transition.

use crate::config::EvolutionConfig;

/// What the engine must do after a generation has been observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagnationAction {
    /// New global best; counters reset and the rate decayed.
    Improved,
    /// No improvement, nothing to do yet.
    Stalled,
    /// Local patience ran out; the rate was raised.
    Boosted,
    /// Global patience ran out; restart the population. Rate and counters
    /// are back at their base values.
    Restart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveState {
    rate: f64,
    base_rate: f64,
    max_rate: f64,
    boost: f64,
    decay: f64,
    patience: usize,
    restart_threshold: usize,
    since_local_improvement: usize,
    since_global_improvement: usize,
}

impl AdaptiveState {
    pub fn new(config: &EvolutionConfig) -> Self {
        Self {
            rate: config.base_mutation_rate,
            base_rate: config.base_mutation_rate,
            max_rate: config.max_mutation_rate,
            boost: config.mutation_boost,
            decay: config.mutation_decay,
            patience: config.patience,
            restart_threshold: config.restart_threshold(),
            since_local_improvement: 0,
            since_global_improvement: 0,
        }
    }

    /// Current per-tick mutation probability.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn since_local_improvement(&self) -> usize {
        self.since_local_improvement
    }

    pub fn since_global_improvement(&self) -> usize {
        self.since_global_improvement
    }

    /// Advance one generation.
    pub fn observe(&mut self, improved: bool) -> StagnationAction {
        if improved {
            self.since_local_improvement = 0;
            self.since_global_improvement = 0;
            self.rate = (self.rate * self.decay).max(self.base_rate);
            return StagnationAction::Improved;
        }

        self.since_local_improvement += 1;
        self.since_global_improvement += 1;

        let mut action = StagnationAction::Stalled;
        if self.since_local_improvement >= self.patience {
            self.rate = (self.rate * self.boost).min(self.max_rate);
            self.since_local_improvement = 0;
            action = StagnationAction::Boosted;
        }

        if self.since_global_improvement >= self.restart_threshold {
            self.since_local_improvement = 0;
            self.since_global_improvement = 0;
            self.rate = self.base_rate;
            action = StagnationAction::Restart;
        }
        action
    }
}

/// Strict improvement beyond `epsilon`.
pub fn is_improvement(candidate: f64, best: f64, epsilon: f64) -> bool {
    candidate > best + epsilon
}
