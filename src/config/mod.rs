pub mod traits;
pub mod music;
pub mod evolution;
pub mod fitness;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use music::MusicConfig;
pub use evolution::EvolutionConfig;
pub use fitness::{FitnessWeights, SliderSettings};
