use crate::config::traits::ConfigSection;
use crate::config::{EvolutionConfig, FitnessWeights, MusicConfig};
use crate::engines::evaluation::FitnessEvaluator;
use crate::engines::generation::{
    adaptive::{is_improvement, AdaptiveState, StagnationAction},
    genome::Genome,
    mutation::HarmonicMutator,
    operators::{measure_crossover, tournament_selection},
    population::Population,
};
use crate::engines::tonal::TonalContext;
use crate::error::{MelodyError, Result};
use crate::types::{GridLayout, PitchRange};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// One row of the run log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub best_global: f64,
    pub best_generation: f64,
    pub mutation_probability: f64,
    pub generations_since_global_improvement: usize,
}

/// Population-level interventions reported to the callback.
#[derive(Debug, Clone, PartialEq)]
pub enum PopulationEvent {
    Reinjected { generation: usize, replaced: usize },
    MutationBoosted { generation: usize, rate: f64 },
    Stagnating { generation: usize, since_improvement: usize, restart_at: usize },
    Restarted { generation: usize, kept: usize },
}

pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, record: &GenerationRecord);
    fn on_population_event(&mut self, event: &PopulationEvent);
}

impl<C: ProgressCallback + ?Sized> ProgressCallback for &mut C {
    fn on_generation_start(&mut self, generation: usize) {
        (**self).on_generation_start(generation);
    }

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        (**self).on_generation_complete(record);
    }

    fn on_population_event(&mut self, event: &PopulationEvent) {
        (**self).on_population_event(event);
    }
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    pub best: Genome,
    pub history: Vec<GenerationRecord>,
}

impl EvolutionOutcome {
    pub fn best_fitness(&self) -> f64 {
        self.best.rank_fitness()
    }
}

/// Generational controller. Owns every piece of run state.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    music: MusicConfig,
    weights: FitnessWeights,
    tonal: TonalContext,
    mutator: HarmonicMutator,
    rng: StdRng,
}

impl EvolutionEngine {
    /// Validate and freeze the configuration for one run.
    ///
    /// Tonal resolution happens here, so a bad key or chord fails before any
    /// genome is scored.
    pub fn new(config: EvolutionConfig, music: MusicConfig, weights: FitnessWeights) -> Result<Self> {
        config.validate()?;
        music.validate()?;
        weights.validate()?;

        let tonal = TonalContext::from_config(&music)?;
        let mutator = HarmonicMutator::new(music.layout(), music.pitch_range(), &tonal);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            music,
            weights,
            tonal,
            mutator,
            rng,
        })
    }

    pub fn tonal(&self) -> &TonalContext {
        &self.tonal
    }

    pub fn music(&self) -> &MusicConfig {
        &self.music
    }

    pub fn evaluator(&self) -> FitnessEvaluator<'_> {
        FitnessEvaluator::new(
            self.music.layout(),
            self.music.pitch_range(),
            &self.tonal,
            &self.weights,
        )
    }

    /// Run the evolution process for the configured number of generations.
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<EvolutionOutcome> {
        let Self {
            config,
            music,
            weights,
            tonal,
            mutator,
            rng,
        } = self;

        let layout = music.layout();
        let range = music.pitch_range();
        let evaluator = FitnessEvaluator::new(layout, range, tonal, weights);

        let mut population = Population::create_initial(config.population_size, layout, range, rng);
        population.evaluate_all(&evaluator)?;

        let mut best_global = population
            .best()
            .cloned()
            .ok_or_else(|| MelodyError::Validation("Population is empty".to_string()))?;
        let mut adaptive = AdaptiveState::new(config);
        let mut history = Vec::with_capacity(config.num_generations);

        log::info!(
            "Starting evolution: {} individuals, {} generations, initial best {:.3}",
            config.population_size,
            config.num_generations,
            best_global.rank_fitness()
        );

        for generation in 1..=config.num_generations {
            callback.on_generation_start(generation);

            population = breed_generation(
                &mut population,
                config,
                layout,
                &evaluator,
                mutator,
                adaptive.rate(),
                rng,
            )?;

            if config.reinjection_interval > 0 && generation % config.reinjection_interval == 0 {
                let replaced = reinject_diversity(
                    &mut population,
                    config.reinjection_fraction,
                    layout,
                    range,
                    &evaluator,
                    rng,
                )?;
                if replaced > 0 {
                    callback.on_population_event(&PopulationEvent::Reinjected { generation, replaced });
                }
            }

            let best_generation = population
                .best()
                .cloned()
                .ok_or_else(|| MelodyError::Validation("Population is empty".to_string()))?;
            let improved = is_improvement(
                best_generation.rank_fitness(),
                best_global.rank_fitness(),
                config.improvement_epsilon,
            );
            if improved {
                best_global = best_generation.clone();
            }

            match adaptive.observe(improved) {
                StagnationAction::Improved => {}
                StagnationAction::Stalled => {
                    let since = adaptive.since_global_improvement();
                    if since % 5 == 0 || since + 1 == config.restart_threshold() {
                        callback.on_population_event(&PopulationEvent::Stagnating {
                            generation,
                            since_improvement: since,
                            restart_at: config.restart_threshold(),
                        });
                    }
                }
                StagnationAction::Boosted => {
                    callback.on_population_event(&PopulationEvent::MutationBoosted {
                        generation,
                        rate: adaptive.rate(),
                    });
                }
                StagnationAction::Restart => {
                    let kept = catastrophic_restart(
                        &mut population,
                        config.restart_elite_count,
                        layout,
                        range,
                        &evaluator,
                        rng,
                    )?;
                    callback.on_population_event(&PopulationEvent::Restarted { generation, kept });
                }
            }

            let record = GenerationRecord {
                generation,
                best_global: best_global.rank_fitness(),
                best_generation: best_generation.rank_fitness(),
                mutation_probability: adaptive.rate(),
                generations_since_global_improvement: adaptive.since_global_improvement(),
            };
            callback.on_generation_complete(&record);
            history.push(record);
        }

        log::info!("Evolution finished. Best fitness: {:.3}", best_global.rank_fitness());
        Ok(EvolutionOutcome {
            best: best_global,
            history,
        })
    }
}

/// Elitism plus tournament/crossover/mutation offspring.
///
/// Children come in pairs; when only one slot is left the second child of the
/// pair is dropped. Every returned member is evaluated.
pub fn breed_generation<R: Rng>(
    population: &mut Population,
    config: &EvolutionConfig,
    layout: GridLayout,
    evaluator: &FitnessEvaluator<'_>,
    mutator: &HarmonicMutator,
    mutation_rate: f64,
    rng: &mut R,
) -> Result<Population> {
    let target = config.population_size;

    population.sort_descending();
    let mut next = Population::new(population.top(config.elitism_count));

    let parents = population.members();
    while next.len() < target {
        let parent1 = tournament_selection(parents, config.tournament_size, rng);
        let parent2 = tournament_selection(parents, config.tournament_size, rng);

        let (child1, child2) = measure_crossover(parent1, parent2, layout, rng);
        let child1 = mutator.mutate(&child1, mutation_rate, rng);
        let child2 = mutator.mutate(&child2, mutation_rate, rng);

        next.push(child1);
        if next.len() < target {
            next.push(child2);
        }
    }

    next.evaluate_pending(evaluator)?;
    Ok(next)
}

/// Replace the worst `fraction` of the population with fresh random genomes.
///
/// At least one individual is replaced when `fraction` is in (0, 1); any
/// other fraction is a no-op. Returns the number replaced.
pub fn reinject_diversity<R: Rng>(
    population: &mut Population,
    fraction: f64,
    layout: GridLayout,
    range: PitchRange,
    evaluator: &FitnessEvaluator<'_>,
    rng: &mut R,
) -> Result<usize> {
    if !(fraction > 0.0 && fraction < 1.0) || population.is_empty() {
        return Ok(0);
    }

    population.sort_descending();
    let n = population.len();
    let replaced = ((n as f64 * fraction) as usize).max(1);

    let mut fresh = Population::create_initial(replaced, layout, range, rng);
    fresh.evaluate_all(evaluator)?;

    for (slot, genome) in population.members_mut()[n - replaced..]
        .iter_mut()
        .zip(fresh.members().iter())
    {
        *slot = genome.clone();
    }
    Ok(replaced)
}

/// Keep the best `elite` genomes and re-randomise every other slot.
///
/// Returns how many elites were kept.
pub fn catastrophic_restart<R: Rng>(
    population: &mut Population,
    elite: usize,
    layout: GridLayout,
    range: PitchRange,
    evaluator: &FitnessEvaluator<'_>,
    rng: &mut R,
) -> Result<usize> {
    population.sort_descending();
    let size = population.len();
    let kept = elite.min(size);

    let mut fresh = Population::create_initial(size - kept, layout, range, rng);
    fresh.evaluate_all(evaluator)?;

    let mut members = population.top(kept);
    members.extend(fresh.members().iter().cloned());
    *population = Population::new(members);
    Ok(kept)
}
