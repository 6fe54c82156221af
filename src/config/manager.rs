use super::{
    evolution::EvolutionConfig,
    fitness::FitnessWeights,
    music::MusicConfig,
    traits::ConfigSection,
};
use crate::error::MelodyError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment variables that override file values,
/// e.g. `MELODYGEN_EVOLUTION__SEED=7`.
pub const ENV_PREFIX: &str = "MELODYGEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub music: MusicConfig,
    pub evolution: EvolutionConfig,
    pub fitness: FitnessWeights,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), MelodyError> {
        self.music.validate()?;
        self.evolution.validate()?;
        self.fitness.validate()?;
        Ok(())
    }
}

/// Loads and edits the configuration before a run starts.
///
/// Once a run begins the configuration is taken out with `into_inner` and
/// never touched again.
pub struct ConfigManager {
    config: AppConfig,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Layer defaults, the TOML file and `MELODYGEN_*` environment overrides.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), MelodyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MelodyError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        log::info!("Loaded configuration from {}", path.display());
        self.config = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MelodyError> {
        let toml_str = toml::to_string_pretty(&self.config)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    pub fn update<F>(&mut self, f: F) -> Result<(), MelodyError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.config.clone();
        f(&mut candidate);
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }

    /// Freeze the configuration for a run.
    pub fn into_inner(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rejects_invalid_and_keeps_previous() {
        let mut manager = ConfigManager::new();
        let result = manager.update(|c| c.music.chords.clear());
        assert!(result.is_err());
        assert_eq!(manager.get().music.chords.len(), 8);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("melody.toml");

        let mut manager = ConfigManager::new();
        manager
            .update(|c| {
                c.music.tonic = "A".to_string();
                c.music.mode = "menor".to_string();
                c.evolution.seed = Some(11);
            })
            .unwrap();
        manager.save_to_file(&path).unwrap();

        let mut loaded = ConfigManager::new();
        loaded.load_from_file(&path).unwrap();
        assert_eq!(loaded.get().music.tonic, "A");
        assert_eq!(loaded.get().evolution.seed, Some(11));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[evolution]\npopulation_size = 10\n").unwrap();

        let mut manager = ConfigManager::new();
        manager.load_from_file(&path).unwrap();
        let config = manager.into_inner();
        assert_eq!(config.evolution.population_size, 10);
        assert_eq!(config.evolution.num_generations, 180);
        assert_eq!(config.music, MusicConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let mut manager = ConfigManager::new();
        assert!(matches!(
            manager.load_from_file("/nonexistent/melody.toml"),
            Err(MelodyError::Configuration(_))
        ));
    }
}
