use crate::engines::evaluation::FitnessEvaluator;
use crate::engines::generation::genome::Genome;
use crate::error::Result;
use crate::types::{GridLayout, PitchRange};
use rand::Rng;
use rayon::prelude::*;

/// Ordered collection of genomes. Insertion order until explicitly sorted.
#[derive(Debug, Clone, Default)]
pub struct Population {
    members: Vec<Genome>,
}

impl Population {
    pub fn new(members: Vec<Genome>) -> Self {
        Self { members }
    }

    /// `size` independent random genomes, not yet evaluated.
    pub fn create_initial<R: Rng>(
        size: usize,
        layout: GridLayout,
        range: PitchRange,
        rng: &mut R,
    ) -> Self {
        let members = (0..size).map(|_| Genome::random(layout, range, rng)).collect();
        Self { members }
    }

    /// Score and cache every member.
    ///
    /// Members are independent, so scoring runs on the rayon pool; the result
    /// is the same as a sequential pass.
    pub fn evaluate_all(&mut self, evaluator: &FitnessEvaluator<'_>) -> Result<()> {
        self.members
            .par_iter_mut()
            .try_for_each(|genome| genome.evaluate(evaluator).map(|_| ()))
    }

    /// Score only members without a cached fitness.
    pub fn evaluate_pending(&mut self, evaluator: &FitnessEvaluator<'_>) -> Result<()> {
        self.members
            .par_iter_mut()
            .filter(|genome| genome.fitness().is_none())
            .try_for_each(|genome| genome.evaluate(evaluator).map(|_| ()))
    }

    /// Highest-fitness member; the first one wins ties.
    pub fn best(&self) -> Option<&Genome> {
        self.members.iter().fold(None, |best: Option<&Genome>, g| match best {
            Some(b) if b.rank_fitness() >= g.rank_fitness() => Some(b),
            _ => Some(g),
        })
    }

    /// Stable sort, best first.
    pub fn sort_descending(&mut self) {
        self.members
            .sort_by(|a, b| b.rank_fitness().total_cmp(&a.rank_fitness()));
    }

    /// Clones of the first `count` members in current order.
    pub fn top(&self, count: usize) -> Vec<Genome> {
        self.members.iter().take(count).cloned().collect()
    }

    pub fn members(&self) -> &[Genome] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [Genome] {
        &mut self.members
    }

    pub fn push(&mut self, genome: Genome) {
        self.members.push(genome);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tick;

    fn scored(fitness: f64) -> Genome {
        Genome::new(vec![Tick::Rest]).with_fitness(fitness)
    }

    #[test]
    fn test_sort_is_stable_and_descending() {
        let mut population = Population::new(vec![
            scored(1.0),
            Genome::new(vec![Tick::Hold]).with_fitness(5.0),
            scored(5.0),
            scored(3.0),
        ]);
        population.sort_descending();

        let order: Vec<f64> = population.members().iter().map(|g| g.rank_fitness()).collect();
        assert_eq!(order, vec![5.0, 5.0, 3.0, 1.0]);
        assert_eq!(population.members()[0].ticks()[0], Tick::Hold);
    }

    #[test]
    fn test_best_picks_first_maximum() {
        let population = Population::new(vec![
            scored(2.0),
            Genome::new(vec![Tick::Hold]).with_fitness(8.0),
            scored(8.0),
        ]);
        let best = population.best().unwrap();
        assert_eq!(best.ticks()[0], Tick::Hold);
        assert!(Population::default().best().is_none());
    }
}
