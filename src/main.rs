use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use melodygen::config::{ConfigManager, SliderSettings};
use melodygen::data::writers::{write_genome_codes, write_midi, write_preset, write_run_log, WeightPreset};
use melodygen::data::MidiImporter;
use melodygen::engines::generation::{ConsoleProgressCallback, EvolutionEngine};
use melodygen::ui::SliderPrompt;

/// Command-line arguments for melodygen
#[derive(Parser, Debug)]
#[command(name = "melodygen")]
#[command(about = "Evolve a melody over a chord progression")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "MELODYGEN_CONFIG")]
    config: Option<PathBuf>,

    /// MIDI file to take tempo, key and chords from
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to write the resulting melody
    #[arg(short, long, default_value = "melody.mid")]
    output: PathBuf,

    /// Directory for the run log, preset and best genome
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of generations
    #[arg(long)]
    generations: Option<usize>,

    /// Skip the slider questions and use the configured weights
    #[arg(long)]
    defaults: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut manager = ConfigManager::new();
    if let Some(path) = &args.config {
        manager
            .load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
    }

    if let Some(path) = &args.input {
        let measures = manager.get().music.measures;
        let score = MidiImporter::load(path, measures)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        manager
            .update(|c| c.music.apply_import(&score))
            .context("Imported score produced an invalid configuration")?;

        let music = &manager.get().music;
        log::info!(
            "Config from MIDI: tempo {} | key {} {} | chords {:?}",
            music.tempo_bpm,
            music.tonic,
            music.mode,
            music.chords
        );
    }

    let sliders = if args.defaults {
        None
    } else {
        let stdin = io::stdin();
        let settings = SliderPrompt::new(stdin.lock(), io::stdout())
            .ask_all(SliderSettings::default())
            .context("Failed to read slider settings")?;
        Some(settings)
    };

    manager.update(|c| {
        if let Some(sliders) = &sliders {
            c.fitness = sliders.apply(c.fitness.clone());
        }
        if let Some(seed) = args.seed {
            c.evolution.seed = Some(seed);
        }
        if let Some(generations) = args.generations {
            c.evolution.num_generations = generations;
        }
    })?;
    let config = manager.into_inner();

    std::fs::create_dir_all(&args.log_dir)
        .with_context(|| format!("Failed to create {}", args.log_dir.display()))?;
    write_preset(
        &WeightPreset::new(sliders.as_ref(), &config.fitness),
        args.log_dir.join("preset.json"),
    )?;

    let mut engine = EvolutionEngine::new(config.evolution, config.music.clone(), config.fitness)
        .context("Failed to set up evolution")?;
    let outcome = engine.run(ConsoleProgressCallback)?;

    write_run_log(&outcome.history, args.log_dir.join("ga_run.csv"))?;
    write_genome_codes(&outcome.best, args.log_dir.join("best_genes.txt"))?;
    write_midi(outcome.best.ticks(), &config.music, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let counts = outcome.best.counts();
    let total = outcome.best.len().max(1) as f64;
    log::info!("Best fitness: {:.3}", outcome.best_fitness());
    log::debug!("Breakdown: {:?}", engine.evaluator().breakdown(outcome.best.ticks())?);
    log::info!("Codes: {:?}", outcome.best.to_codes());
    log::info!(
        "NOTES={} REST={} HOLD={} | rest%={:.2} hold%={:.2}",
        counts.notes,
        counts.rests,
        counts.holds,
        counts.rests as f64 / total,
        counts.holds as f64 / total
    );
    log::info!("Exported {}", args.output.display());

    Ok(())
}
