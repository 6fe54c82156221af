use crate::error::MelodyError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), MelodyError>;
}

/// Shorthand for the configuration error raised by `validate`.
pub(crate) fn invalid(section: &str, message: impl Into<String>) -> MelodyError {
    MelodyError::Configuration(format!("[{}] {}", section, message.into()))
}
