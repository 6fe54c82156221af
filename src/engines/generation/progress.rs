use super::evolution_engine::{GenerationRecord, PopulationEvent, ProgressCallback};

/// Logs run progress through the `log` facade.
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        log::debug!("Generation {} starting...", generation);
    }

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        log::info!(
            "Gen {:03} | best {:.3} | gen {:.3} | p_mut {:.3}",
            record.generation,
            record.best_global,
            record.best_generation,
            record.mutation_probability
        );
    }

    fn on_population_event(&mut self, event: &PopulationEvent) {
        match event {
            PopulationEvent::Reinjected { generation, replaced } => {
                log::info!("Gen {:03} | reinjection replaced {} worst individuals", generation, replaced);
            }
            PopulationEvent::MutationBoosted { generation, rate } => {
                log::info!("Gen {:03} | mutation boosted to {:.3}", generation, rate);
            }
            PopulationEvent::Stagnating { generation, since_improvement, restart_at } => {
                log::info!(
                    "Gen {:03} | {} generations without improvement (restart at {})",
                    generation,
                    since_improvement,
                    restart_at
                );
            }
            PopulationEvent::Restarted { generation, kept } => {
                log::warn!("Gen {:03} | catastrophic restart, kept {} elites", generation, kept);
            }
        }
    }
}

/// Keeps every generation record in memory.
#[derive(Debug, Default)]
pub struct RecordingProgressCallback {
    pub records: Vec<GenerationRecord>,
    pub events: Vec<PopulationEvent>,
}

impl ProgressCallback for RecordingProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        self.records.push(record.clone());
    }

    fn on_population_event(&mut self, event: &PopulationEvent) {
        self.events.push(event.clone());
    }
}
