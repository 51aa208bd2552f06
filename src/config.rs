use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Tunable constants for curve fitting and timeline simulation.
///
/// Loaded from a TOML file; any key left out keeps its default:
///
/// ```toml
/// degree = 5
/// grid_step = 0.5
/// value_step = 0.01
/// terminal_sentinel = 1e-12
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Total degree of the polynomial surface fitted for every line category
    pub degree: u32,
    /// Age step of the simulation grid
    pub grid_step: f64,
    /// Density step used by parameter scans and by the vertical cut segments of the track
    pub value_step: f64,
    /// `value_after` of the terminal event closing every timeline
    pub terminal_sentinel: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            degree: 5,
            grid_step: 0.5,
            value_step: 0.01,
            terminal_sentinel: 1e-12,
        }
    }
}

impl EngineSettings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, PlannerError> {
        let settings: EngineSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PlannerError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.degree == 0 {
            return Err(PlannerError::InvalidArgument(
                "polynomial degree must be at least 1".to_string(),
            ));
        }
        if !(self.grid_step.is_finite() && self.grid_step > 0.0) {
            return Err(PlannerError::InvalidArgument(format!(
                "grid_step must be positive, got {}",
                self.grid_step
            )));
        }
        if !(self.value_step.is_finite() && self.value_step > 0.0) {
            return Err(PlannerError::InvalidArgument(format!(
                "value_step must be positive, got {}",
                self.value_step
            )));
        }
        if !(self.terminal_sentinel.is_finite() && self.terminal_sentinel > 0.0) {
            return Err(PlannerError::InvalidArgument(format!(
                "terminal_sentinel must be a small positive number, got {}",
                self.terminal_sentinel
            )));
        }
        Ok(())
    }
}
