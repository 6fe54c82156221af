mod genome;
mod midi;
mod preset;
mod run_log;

pub use genome::{read_genome_codes, write_genome_codes};
pub use midi::{melody_to_smf, write_midi, TICKS_PER_QUARTER};
pub use preset::{write_preset, WeightPreset};
pub use run_log::{read_run_log, run_log_frame, write_run_log};
