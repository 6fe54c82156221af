use melodygen::config::{ConfigManager, EvolutionConfig, FitnessWeights, MusicConfig};
use melodygen::data::writers::{read_genome_codes, read_run_log, write_genome_codes, write_midi, write_run_log};
use melodygen::data::MidiImporter;
use melodygen::engines::generation::{
    EvolutionEngine, GenerationRecord, PopulationEvent, ProgressCallback,
};

/// Simple progress callback for testing
#[derive(Default)]
struct TestProgressCallback {
    last_generation: usize,
    restarts: usize,
}

impl ProgressCallback for TestProgressCallback {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, record: &GenerationRecord) {
        self.last_generation = record.generation;
        println!(
            "Generation {}: best {:.3}, p_mut {:.3}",
            record.generation, record.best_global, record.mutation_probability
        );
    }

    fn on_population_event(&mut self, event: &PopulationEvent) {
        if let PopulationEvent::Restarted { .. } = event {
            self.restarts += 1;
        }
    }
}

fn quick_config(seed: u64) -> EvolutionConfig {
    EvolutionConfig {
        population_size: 16,
        num_generations: 30,
        patience: 3,
        reinjection_interval: 5,
        seed: Some(seed),
        ..EvolutionConfig::default()
    }
}

#[test]
fn test_full_run_improves_on_random_start() {
    let mut callback = TestProgressCallback::default();
    let mut engine =
        EvolutionEngine::new(quick_config(17), MusicConfig::default(), FitnessWeights::default()).unwrap();
    let outcome = engine.run(&mut callback).unwrap();

    assert_eq!(callback.last_generation, 30);
    assert_eq!(outcome.history.len(), 30);
    assert_eq!(outcome.best.len(), 64);
    assert!(outcome.history.last().unwrap().best_global >= outcome.history[0].best_global);
    assert!(outcome
        .history
        .iter()
        .all(|r| r.mutation_probability >= 0.08 - 1e-12 && r.mutation_probability <= 0.35 + 1e-12));

    let rescored = engine.evaluator().score(outcome.best.ticks()).unwrap();
    assert_eq!(rescored, outcome.best_fitness());
}

#[test]
fn test_stagnation_triggers_restart() {
    // Every melody scores the same, so nothing ever improves
    let weights = FitnessWeights {
        w_chord: 0.0,
        w_scale: 0.0,
        w_movement: 0.0,
        w_syncopation: 0.0,
        w_motif: 0.0,
        w_contour: 0.0,
        w_density: 0.0,
        pen_measure_start_off_chord: 0.0,
        pen_out_of_range: 0.0,
        pen_excess_attacks: 0.0,
        pen_poor_final_measure: 0.0,
        pen_missing_final_note: 0.0,
        pen_final_note_off_chord: 0.0,
        pen_rest_ratio: 0.0,
        pen_hold_ratio: 0.0,
        pen_poor_measure: 0.0,
        ..FitnessWeights::default()
    };
    let mut callback = TestProgressCallback::default();
    let mut engine = EvolutionEngine::new(quick_config(5), MusicConfig::default(), weights).unwrap();
    let outcome = engine.run(&mut callback).unwrap();

    // Restart after 6 flat generations, five times in 30
    assert_eq!(callback.restarts, 5);
    assert!(outcome.history.iter().all(|r| r.best_global == 100.0));
    assert_eq!(outcome.history[5].generations_since_global_improvement, 0);
    assert_eq!(outcome.history[5].mutation_probability, 0.08);
}

#[test]
fn test_outputs_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("melody.toml");
    std::fs::write(
        &config_path,
        "[music]\nmeasures = 4\nchords = [\"Am\", \"F\", \"C\", \"G\"]\ntonic = \"A\"\nmode = \"menor\"\n\n[evolution]\npopulation_size = 12\nnum_generations = 6\nseed = 3\n",
    )
    .unwrap();

    let mut manager = ConfigManager::new();
    manager.load_from_file(&config_path).unwrap();
    let config = manager.into_inner();

    let mut engine =
        EvolutionEngine::new(config.evolution.clone(), config.music.clone(), config.fitness.clone()).unwrap();
    let mut callback = TestProgressCallback::default();
    let outcome = engine.run(&mut callback).unwrap();
    assert_eq!(outcome.best.len(), 32);

    let log_path = dir.path().join("ga_run.csv");
    write_run_log(&outcome.history, &log_path).unwrap();
    assert_eq!(read_run_log(&log_path).unwrap().height(), 6);

    let genes_path = dir.path().join("best_genes.txt");
    write_genome_codes(&outcome.best, &genes_path).unwrap();
    assert_eq!(read_genome_codes(&genes_path).unwrap().ticks(), outcome.best.ticks());

    let midi_path = dir.path().join("melody.mid");
    write_midi(outcome.best.ticks(), &config.music, &midi_path).unwrap();
    assert!(std::fs::metadata(&midi_path).unwrap().len() > 0);
}

#[test]
fn test_exported_melody_can_be_reimported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chords.mid");
    let music = MusicConfig::default();

    // Whole-note roots of C G Am F C G F C
    let roots = [60u8, 67, 69, 65, 60, 67, 65, 60];
    let ticks: Vec<melodygen::types::Tick> = roots
        .iter()
        .flat_map(|r| {
            std::iter::once(melodygen::types::Tick::Pitch(*r))
                .chain(std::iter::repeat(melodygen::types::Tick::Hold).take(7))
        })
        .collect();
    write_midi(&ticks, &music, &path).unwrap();

    let score = MidiImporter::load(&path, 8).unwrap();
    assert_eq!(score.bpm, Some(120));
    assert_eq!(score.time_signature.as_deref(), Some("4/4"));
    assert_eq!(score.measures_detected, 8);
    assert_eq!(score.chords.len(), 8);
    assert!(matches!(
        MidiImporter::load(&path, 9),
        Err(melodygen::MelodyError::ResourcePrecondition(_))
    ));
}
