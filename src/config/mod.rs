//! Typed configuration for the mapping and plausibility passes.
//!
//! Both structures can be built in code, relying on their [`Default`]s, or
//! loaded from a `.toml` or `.json` file through [`TryFrom<&Path>`].

mod mapping;
mod plausibility;

#[cfg(test)]
mod test;

pub use mapping::MappingConfig;
pub use plausibility::{PlausibilityConfig, ToleranceRange};

use crate::Mode;

use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("failure reading {0}: {1}")]
    Read(String, String),

    #[error("failure decoding {0}: {1}")]
    Decode(String, String),

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("no direction change threshold is configured for mode {0}")]
    MissingThreshold(Mode),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Reads and decodes a configuration file, choosing the decoder by extension.
pub(crate) fn load<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let name = path.display().to_string();
    let read = || {
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(name.clone(), e.to_string()))
    };

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => {
            toml::from_str(&read()?).map_err(|e| ConfigError::Decode(name.clone(), e.to_string()))
        }
        Some("json") => serde_json::from_str(&read()?)
            .map_err(|e| ConfigError::Decode(name.clone(), e.to_string())),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}
