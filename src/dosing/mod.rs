use serde::{Deserialize, Serialize};
use crate::error::ValidationError;

/// Repeated intermittent-infusion schedule, used for both drug and inhibitor.
///
/// Times are in hours, concentrations in μg/mL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DosingRegimen {
    pub dosing_interval: f64,
    pub infusion_time: f64,
    pub half_life: f64,
    pub max_concentration: f64,
}

impl DosingRegimen {
    pub fn new(dosing_interval: f64, infusion_time: f64, half_life: f64, max_concentration: f64) -> Self {
        Self {
            dosing_interval,
            infusion_time,
            half_life,
            max_concentration,
        }
    }

    /// Returns every violated rule, in rule order. Empty means valid.
    ///
    /// NaN fails every comparison, so a NaN field is reported the same way
    /// as an out-of-range one.
    pub fn violations(&self) -> Vec<String> {
        let mut messages = Vec::new();

        if !(self.dosing_interval > 0.0) {
            messages.push("Dosing interval must be positive".to_string());
        }
        if !(self.infusion_time >= 0.0) {
            messages.push("Infusion time must be non-negative".to_string());
        }
        if !(self.infusion_time <= self.dosing_interval) {
            messages.push("Infusion time cannot exceed dosing interval".to_string());
        }
        if !(self.half_life > 0.0) {
            messages.push("Half-life must be positive".to_string());
        }
        if !(self.max_concentration > 0.0) {
            messages.push("Max concentration must be positive".to_string());
        }

        messages
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check(self.violations())
    }

    /// Same regimen with a new interval and peak, e.g. from an optimizer
    /// recommendation.
    pub fn with_interval_and_dose(&self, dosing_interval: f64, max_concentration: f64) -> Self {
        Self {
            dosing_interval,
            max_concentration,
            ..*self
        }
    }
}

/// Validates drug and inhibitor together, prefixing each message with its
/// source so the combined list stays readable.
pub fn regimen_violations(drug: &DosingRegimen, inhibitor: &DosingRegimen) -> Vec<String> {
    let mut messages: Vec<String> = drug
        .violations()
        .into_iter()
        .map(|m| format!("Drug: {}", m))
        .collect();
    messages.extend(
        inhibitor
            .violations()
            .into_iter()
            .map(|m| format!("Inhibitor: {}", m)),
    );
    messages
}
