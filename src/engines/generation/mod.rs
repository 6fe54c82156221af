pub mod adaptive;
pub mod evolution_engine;
pub mod genome;
pub mod mutation;
pub mod operators;
pub mod population;
pub mod progress;

pub use adaptive::{is_improvement, AdaptiveState, StagnationAction};
pub use evolution_engine::{
    breed_generation, catastrophic_restart, reinject_diversity, EvolutionEngine, EvolutionOutcome,
    GenerationRecord, PopulationEvent, ProgressCallback,
};
pub use genome::{Genome, TickCounts};
pub use mutation::HarmonicMutator;
pub use operators::{crossover_at, measure_crossover, roulette_index, tournament_selection};
pub use population::Population;
pub use progress::{ConsoleProgressCallback, RecordingProgressCallback};
