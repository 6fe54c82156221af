use crate::engines::generation::genome::Genome;
use crate::engines::generation::operators::roulette_index;
use crate::engines::tonal::{PitchClassSet, TonalContext};
use crate::types::{sounding_pitch, GridLayout, PitchRange, Tick};
use rand::Rng;

/// Share of mutated ticks that become a rest.
const MUTATE_TO_REST: f64 = 0.15;
/// Share of mutated ticks that become a hold.
const MUTATE_TO_HOLD: f64 = 0.15;
/// Chance of drawing from chord tones instead of scale tones.
const CHORD_TONE_PREFERENCE: f64 = 0.70;

/// Harmony-aware point mutation.
///
/// New pitches favour the current measure's chord, then the scale, and lean
/// towards small steps from the pitch sounding just before the mutated tick.
pub struct HarmonicMutator {
    range: PitchRange,
    layout: GridLayout,
    chord_candidates: Vec<Vec<u8>>, // In-range chord tones per measure
    scale_candidates: Vec<u8>,
}

fn pitches_in(set: PitchClassSet, range: PitchRange) -> Vec<u8> {
    range.iter().filter(|p| set.contains_pitch(*p)).collect()
}

impl HarmonicMutator {
    pub fn new(layout: GridLayout, range: PitchRange, tonal: &TonalContext) -> Self {
        let chord_candidates = (0..layout.measures)
            .map(|m| pitches_in(tonal.chord(m), range))
            .collect();
        let scale_candidates = pitches_in(tonal.scale(), range);

        Self {
            range,
            layout,
            chord_candidates,
            scale_candidates,
        }
    }

    /// Return a mutated copy of `genome`; the parent is left untouched.
    ///
    /// Each tick is replaced with probability `gene_rate`. Ticks are visited in
    /// order, so a new pitch is chosen relative to already-mutated neighbours.
    pub fn mutate<R: Rng>(&self, genome: &Genome, gene_rate: f64, rng: &mut R) -> Genome {
        let mut ticks = genome.ticks().to_vec();

        for i in 0..ticks.len() {
            if rng.gen::<f64>() >= gene_rate {
                continue;
            }
            let r = rng.gen::<f64>();
            ticks[i] = if r < MUTATE_TO_REST {
                Tick::Rest
            } else if r < MUTATE_TO_REST + MUTATE_TO_HOLD {
                Tick::Hold
            } else {
                Tick::Pitch(self.choose_pitch(&ticks, i, rng))
            };
        }

        Genome::new(ticks)
    }

    /// Pick a musical pitch for tick `index`.
    pub fn choose_pitch<R: Rng>(&self, ticks: &[Tick], index: usize, rng: &mut R) -> u8 {
        let measure = self.layout.measure_of(index);
        let chord = self
            .chord_candidates
            .get(measure)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let prev = index
            .checked_sub(1)
            .and_then(|i| sounding_pitch(ticks, i));

        if !chord.is_empty() && rng.gen::<f64>() < CHORD_TONE_PREFERENCE {
            return self.pick_near(chord, prev, rng);
        }
        if !self.scale_candidates.is_empty() {
            return self.pick_near(&self.scale_candidates, prev, rng);
        }
        self.range.sample(rng)
    }

    /// Weighted by 1 / (1 + distance to `prev`); uniform without a previous pitch.
    fn pick_near<R: Rng>(&self, candidates: &[u8], prev: Option<u8>, rng: &mut R) -> u8 {
        let Some(prev) = prev else {
            return candidates[rng.gen_range(0..candidates.len())];
        };

        let weights: Vec<f64> = candidates
            .iter()
            .map(|n| 1.0 / (1.0 + f64::from(n.abs_diff(prev))))
            .collect();

        roulette_index(&weights, rng)
            .map(|i| candidates[i])
            .unwrap_or(candidates[candidates.len() - 1])
    }
}
