use super::traits::{invalid, ConfigSection};
use crate::error::MelodyError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub num_generations: usize,
    pub tournament_size: usize,
    pub elitism_count: usize,

    // Adaptive mutation
    pub base_mutation_rate: f64,
    pub max_mutation_rate: f64,
    pub mutation_boost: f64,
    pub mutation_decay: f64,
    pub patience: usize,
    pub improvement_epsilon: f64,

    // Anti-stagnation
    pub reinjection_interval: usize, // 0 disables reinjection
    pub reinjection_fraction: f64,
    pub restart_elite_count: usize,

    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            num_generations: 180,
            tournament_size: 3,
            elitism_count: 2,
            base_mutation_rate: 0.08,
            max_mutation_rate: 0.35,
            mutation_boost: 1.60,
            mutation_decay: 0.90,
            patience: 12,
            improvement_epsilon: 1e-4,
            reinjection_interval: 15,
            reinjection_fraction: 0.15,
            restart_elite_count: 2,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Generations without a global improvement that trigger a restart.
    pub fn restart_threshold(&self) -> usize {
        self.patience * 2
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), MelodyError> {
        let section = Self::section_name();
        if self.population_size < 2 {
            return Err(invalid(section, "Population size must be at least 2"));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(invalid(section, "Tournament size must be between 1 and the population size"));
        }
        if self.elitism_count >= self.population_size {
            return Err(invalid(section, "Elitism count must be smaller than the population size"));
        }
        if self.restart_elite_count > self.population_size {
            return Err(invalid(section, "Restart elite count exceeds the population size"));
        }
        for (name, rate) in [
            ("Base mutation rate", self.base_mutation_rate),
            ("Max mutation rate", self.max_mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(section, format!("{} must be between 0 and 1", name)));
            }
        }
        if self.base_mutation_rate > self.max_mutation_rate {
            return Err(invalid(section, "Base mutation rate exceeds the maximum rate"));
        }
        if self.mutation_boost < 1.0 || !(0.0..=1.0).contains(&self.mutation_decay) {
            return Err(invalid(section, "Mutation boost must be >= 1 and decay within [0, 1]"));
        }
        if self.patience == 0 {
            return Err(invalid(section, "Patience must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.reinjection_fraction) {
            return Err(invalid(section, "Reinjection fraction must be within [0, 1)"));
        }
        if self.improvement_epsilon < 0.0 {
            return Err(invalid(section, "Improvement epsilon must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EvolutionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.restart_threshold(), 24);
    }

    #[test]
    fn test_rejects_oversized_elite() {
        let config = EvolutionConfig {
            population_size: 4,
            elitism_count: 4,
            ..EvolutionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_mutation_bounds() {
        let config = EvolutionConfig {
            base_mutation_rate: 0.5,
            max_mutation_rate: 0.2,
            ..EvolutionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
