use crate::engines::generation::genome::Genome;
use crate::types::GridLayout;
use rand::seq::index;
use rand::Rng;

/// Tournament selection: best of K distinct random candidates.
///
/// Candidates are drawn without replacement; on equal fitness the first one
/// drawn wins. Panics if the population is empty.
pub fn tournament_selection<'p, R: Rng>(
    population: &'p [Genome],
    tournament_size: usize,
    rng: &mut R,
) -> &'p Genome {
    let amount = tournament_size.clamp(1, population.len());
    let mut candidates = index::sample(rng, population.len(), amount).into_iter();

    let mut best = &population[candidates.next().unwrap_or(0)];
    for idx in candidates {
        if population[idx].rank_fitness() > best.rank_fitness() {
            best = &population[idx];
        }
    }
    best
}

/// Splice two parents at tick `cut`: the first child takes `parent1` before
/// the cut and `parent2` after it, the second child the complement.
pub fn crossover_at(parent1: &Genome, parent2: &Genome, cut: usize) -> (Genome, Genome) {
    let (a, b) = (parent1.ticks(), parent2.ticks());
    let cut = cut.min(a.len()).min(b.len());

    let child1 = [&a[..cut], &b[cut..]].concat();
    let child2 = [&b[..cut], &a[cut..]].concat();
    (Genome::new(child1), Genome::new(child2))
}

/// Single-point crossover on a random measure boundary.
///
/// The cut never falls inside a measure or at either end of the melody. With
/// a single measure the children are plain copies of the parents.
pub fn measure_crossover<R: Rng>(
    parent1: &Genome,
    parent2: &Genome,
    layout: GridLayout,
    rng: &mut R,
) -> (Genome, Genome) {
    if layout.measures < 2 {
        return (
            Genome::new(parent1.ticks().to_vec()),
            Genome::new(parent2.ticks().to_vec()),
        );
    }

    let cut_measure = rng.gen_range(1..layout.measures);
    crossover_at(parent1, parent2, cut_measure * layout.subdivisions)
}

/// Roulette-wheel pick over non-negative weights.
///
/// Builds the cumulative distribution and binary-searches a uniform draw in
/// it. Returns `None` for an empty slice; zero total weight falls back to a
/// uniform pick.
pub fn roulette_index<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let cumulative: Vec<f64> = weights
        .iter()
        .scan(0.0, |acc, w| {
            *acc += w.max(0.0);
            Some(*acc)
        })
        .collect();
    let total = cumulative[cumulative.len() - 1];
    if total <= 0.0 {
        return Some(rng.gen_range(0..weights.len()));
    }

    let spin = rng.gen::<f64>() * total;
    let idx = cumulative.partition_point(|c| *c < spin);
    Some(idx.min(weights.len() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tick;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scored(fitness: f64) -> Genome {
        Genome::new(vec![Tick::Pitch(60)]).with_fitness(fitness)
    }

    #[test]
    fn test_full_tournament_returns_max() {
        let population: Vec<Genome> = [3.0, 9.0, 1.0, 7.0].iter().map(|f| scored(*f)).collect();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let winner = tournament_selection(&population, 4, &mut rng);
            assert_eq!(winner.fitness(), Some(9.0));
        }
    }

    #[test]
    fn test_tournament_winner_beats_or_ties_field() {
        let population: Vec<Genome> = (0..10).map(|f| scored(f as f64)).collect();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..50 {
            let winner = tournament_selection(&population, 3, &mut rng);
            // Without replacement, the winner of 3 distinct draws is never one of the two worst
            assert!(winner.fitness().unwrap() >= 2.0);
        }
    }

    #[test]
    fn test_crossover_cut_on_measure_boundary() {
        let layout = GridLayout::new(8, 8);
        let p1 = Genome::new(vec![Tick::Pitch(60); 64]);
        let p2 = Genome::new(vec![Tick::Pitch(70); 64]);
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..50 {
            let (c1, c2) = measure_crossover(&p1, &p2, layout, &mut rng);
            assert_eq!(c1.len(), 64);
            assert_eq!(c2.len(), 64);
            assert!(c1.fitness().is_none());

            let cut = c1.ticks().iter().position(|t| *t == Tick::Pitch(70)).unwrap();
            assert_eq!(cut % 8, 0);
            assert!((8..=56).contains(&cut));
            assert!(c2.ticks()[..cut].iter().all(|t| *t == Tick::Pitch(70)));
            assert!(c2.ticks()[cut..].iter().all(|t| *t == Tick::Pitch(60)));
        }
    }

    #[test]
    fn test_roulette_prefers_heavy_weights() {
        let mut rng = StdRng::seed_from_u64(1);
        let weights = [1.0, 0.0, 9.0];
        let mut hits = [0usize; 3];
        for _ in 0..2000 {
            hits[roulette_index(&weights, &mut rng).unwrap()] += 1;
        }
        assert_eq!(hits[1], 0);
        assert!(hits[2] > hits[0] * 5);
        assert_eq!(roulette_index(&[], &mut rng), None);
    }
}
