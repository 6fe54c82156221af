use crate::engines::generation::Genome;
use crate::error::{MelodyError, Result};
use std::path::Path;

/// Write the genome as one line of comma-separated integer codes.
pub fn write_genome_codes<P: AsRef<Path>>(genome: &Genome, path: P) -> Result<()> {
    let line = genome
        .to_codes()
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",");
    std::fs::write(path.as_ref(), format!("{}\n", line))?;
    Ok(())
}

pub fn read_genome_codes<P: AsRef<Path>>(path: P) -> Result<Genome> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let codes = text
        .trim()
        .split(',')
        .map(|field| {
            field
                .trim()
                .parse::<i32>()
                .map_err(|_| MelodyError::Validation(format!("Invalid genome code '{}'", field)))
        })
        .collect::<Result<Vec<_>>>()?;
    Genome::from_codes(&codes)
}
