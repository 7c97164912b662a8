use std::{fs, path::Path};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CELL_SIZE: i32 = 100;

/// Physics settings, usually read from a JSON file. Missing fields fall back
/// to their defaults.
#[derive(Debug, Clone, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Side length of a spatial hash cell, in world units.
    pub cell_size: i32,
    pub debug_draw: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            debug_draw: false,
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PhysicsConfigError {
    #[error("Could not load config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Cell size must be positive, got {0}")]
    InvalidCellSize(i32),
}

impl PhysicsConfig {
    pub fn from_json_str(json: &str) -> Result<Self, PhysicsConfigError> {
        let config = serde_json::from_str::<PhysicsConfig>(json)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PhysicsConfigError> {
        let json = fs::read_to_string(path)?;

        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), PhysicsConfigError> {
        if self.cell_size <= 0 {
            return Err(PhysicsConfigError::InvalidCellSize(self.cell_size));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = PhysicsConfig::from_json_str(r#"{ "debug_draw": true }"#).unwrap();

        assert_eq!(config.cell_size, DEFAULT_CELL_SIZE);
        assert!(config.debug_draw);
        assert_eq!(PhysicsConfig::from_json_str("{}").unwrap(), PhysicsConfig::default());
    }

    #[test]
    fn rejects_non_positive_cell_size() {
        let err = PhysicsConfig::from_json_str(r#"{ "cell_size": 0 }"#).unwrap_err();

        assert!(matches!(err, PhysicsConfigError::InvalidCellSize(0)));
    }

    #[test]
    fn reports_malformed_json() {
        let err = PhysicsConfig::from_json_str(r#"{ "cell_size": "big" }"#).unwrap_err();

        assert!(matches!(err, PhysicsConfigError::JsonError(_)));
    }

    #[test]
    fn reports_missing_file() {
        let err = PhysicsConfig::load("does/not/exist.json").unwrap_err();

        assert!(matches!(err, PhysicsConfigError::Io(_)));
    }
}
