use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::dosing::{regimen_violations, DosingRegimen};
use crate::error::{PkpdResult, ValidationError};
use crate::models::PDParameters;
use crate::optimizer::OptimizationTarget;

pub const MAX_CYCLES: u32 = 10;
/// Smallest accepted grid step in hours; bounds the number of samples per run.
pub const MIN_TIME_STEP: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub num_cycles: u32,
    pub time_step: f64, // hours
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_cycles: 3,
            time_step: 0.1,
        }
    }
}

impl SimulationConfig {
    pub fn violations(&self) -> Vec<String> {
        let mut messages = Vec::new();

        if self.num_cycles < 1 || self.num_cycles > MAX_CYCLES {
            messages.push(format!("Number of cycles must be between 1 and {}", MAX_CYCLES));
        }
        if !(self.time_step > 0.0) || !self.time_step.is_finite() {
            messages.push("Time step must be positive".to_string());
        } else if self.time_step < MIN_TIME_STEP {
            messages.push(format!("Time step must be at least {} hours", MIN_TIME_STEP));
        }

        messages
    }
}

/// Everything one simulation run needs, as read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub drug: DosingRegimen,
    pub inhibitor: DosingRegimen,
    pub pd: PDParameters,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub target: Option<OptimizationTarget>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> PkpdResult<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses the file without validating, for callers that adjust the
    /// config before checking it.
    pub fn read_file<P: AsRef<Path>>(path: P) -> PkpdResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Replaces the simulation grid settings where an override is given.
    pub fn apply_overrides(&mut self, num_cycles: Option<u32>, time_step: Option<f64>) {
        if let Some(num_cycles) = num_cycles {
            self.simulation.num_cycles = num_cycles;
        }
        if let Some(time_step) = time_step {
            self.simulation.time_step = time_step;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check(self.violations())
    }

    pub fn violations(&self) -> Vec<String> {
        let mut messages = regimen_violations(&self.drug, &self.inhibitor);
        messages.extend(self.pd.violations());
        messages.extend(self.simulation.violations());

        if let Some(target) = &self.target {
            messages.extend(target.violations());
        }

        messages
    }
}
