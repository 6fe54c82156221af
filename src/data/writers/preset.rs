use crate::config::{FitnessWeights, SliderSettings};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Slider values and the weights they resolved to, as one flat JSON object.
///
/// Slider keys are only present when the sliders produced the weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPreset {
    pub generated_at: DateTime<Utc>,
    pub sliders_applied: bool,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl WeightPreset {
    pub fn new(sliders: Option<&SliderSettings>, weights: &FitnessWeights) -> Self {
        let mut values = sliders.map(SliderSettings::to_flat_map).unwrap_or_default();
        values.extend(weights.to_flat_map());
        Self {
            generated_at: Utc::now(),
            sliders_applied: sliders.is_some(),
            values,
        }
    }
}

pub fn write_preset<P: AsRef<Path>>(preset: &WeightPreset, path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(preset)?;
    std::fs::write(path.as_ref(), json)?;
    log::info!("Weight preset saved to {}", path.as_ref().display());
    Ok(())
}
