pub mod connectors;
pub mod writers;

pub use connectors::{ImportedScore, MidiImporter};
pub use writers::{write_genome_codes, write_midi, write_preset, write_run_log, WeightPreset};
