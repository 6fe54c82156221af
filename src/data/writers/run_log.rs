use crate::engines::generation::GenerationRecord;
use crate::error::Result;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Per-generation history as a DataFrame, one row per generation.
pub fn run_log_frame(history: &[GenerationRecord]) -> Result<DataFrame> {
    let df = df! {
        "generation" => history.iter().map(|r| r.generation as u64).collect::<Vec<_>>(),
        "best_global" => history.iter().map(|r| r.best_global).collect::<Vec<_>>(),
        "best_generation" => history.iter().map(|r| r.best_generation).collect::<Vec<_>>(),
        "mutation_probability" => history.iter().map(|r| r.mutation_probability).collect::<Vec<_>>(),
        "generations_since_global_improvement" => history
            .iter()
            .map(|r| r.generations_since_global_improvement as u64)
            .collect::<Vec<_>>(),
    }?;
    Ok(df)
}

pub fn write_run_log<P: AsRef<Path>>(history: &[GenerationRecord], path: P) -> Result<()> {
    let mut df = run_log_frame(history)?;
    let mut file = File::create(path.as_ref())?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
    log::info!("Run log written to {}", path.as_ref().display());
    Ok(())
}

pub fn read_run_log<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    Ok(df)
}
