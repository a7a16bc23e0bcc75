//! Rule-based dosing recommendation.
//!
//! Compares the achieved time above MIC against a target and nudges either
//! the dose or the dosing interval, then applies safety overrides based on
//! the simulated peak and trough. The projected outcome of the
//! recommendation is estimated from a coarse single-cycle profile.

use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::dosing::DosingRegimen;
use crate::error::ValidationError;
use crate::models::{InfusionProfile, PDParameters};
use crate::simulation::SimulationSummary;

const UNDERTREATED_RATIO: f64 = 0.8;
const OVERTREATED_RATIO: f64 = 1.2;
const MIN_INTERVAL: f64 = 6.0; // hours
const MAX_INTERVAL: f64 = 48.0; // hours
const PROJECTION_POINTS: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationTarget {
    pub min_effective_conc: f64,
    pub max_safe_conc: f64,
    pub target_percent_time_above_mic: f64,
}

impl OptimizationTarget {
    pub fn new(min_effective_conc: f64, max_safe_conc: f64, target_percent_time_above_mic: f64) -> Self {
        Self {
            min_effective_conc,
            max_safe_conc,
            target_percent_time_above_mic,
        }
    }

    pub fn violations(&self) -> Vec<String> {
        let mut messages = Vec::new();

        if !(self.min_effective_conc > 0.0) {
            messages.push("Minimum effective concentration must be positive".to_string());
        }
        if !(self.max_safe_conc > 0.0) {
            messages.push("Maximum safe concentration must be positive".to_string());
        }
        if !(self.max_safe_conc > self.min_effective_conc) {
            messages.push(
                "Maximum safe concentration must exceed minimum effective concentration".to_string(),
            );
        }
        if !(self.target_percent_time_above_mic > 0.0 && self.target_percent_time_above_mic <= 100.0) {
            messages.push("Target time above MIC must be between 0 and 100 percent".to_string());
        }

        messages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskAssessment {
    #[serde(rename = "Low")]
    Low,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "High - Risk of subtherapeutic levels")]
    Subtherapeutic,
    #[serde(rename = "High - Risk of toxicity")]
    Toxicity,
}

impl RiskAssessment {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskAssessment::Low => "Low",
            RiskAssessment::Moderate => "Moderate",
            RiskAssessment::Subtherapeutic => "High - Risk of subtherapeutic levels",
            RiskAssessment::Toxicity => "High - Risk of toxicity",
        }
    }
}

impl fmt::Display for RiskAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRecommendation {
    pub recommended_interval: f64,
    pub recommended_dose: f64,
    pub expected_percent_time_above_mic: f64,
    pub expected_peak_conc: f64,
    pub expected_trough_conc: f64,
    pub risk_assessment: RiskAssessment,
    pub confidence: f64,
}

impl OptimizationRecommendation {
    /// Drug regimen for a re-run with the recommended interval and dose.
    pub fn apply_to(&self, drug: &DosingRegimen) -> DosingRegimen {
        drug.with_interval_and_dose(self.recommended_interval, self.recommended_dose)
    }
}

/// Proposes a revised drug interval and dose for `target`.
///
/// `chart_peak` and `chart_trough` are the drug maximum and minimum of the
/// simulation that produced `current`. Fails only when `target` itself is
/// invalid.
pub fn optimize(
    drug: &DosingRegimen,
    pd: &PDParameters,
    current: &SimulationSummary,
    chart_peak: f64,
    chart_trough: f64,
    target: &OptimizationTarget,
) -> Result<OptimizationRecommendation, ValidationError> {
    ValidationError::check(target.violations())?;

    let ratio = current.percent_time_above_mic / target.target_percent_time_above_mic;
    let mut interval = drug.dosing_interval;
    let mut dose = drug.max_concentration;
    let mut confidence = 0.7;
    let mut risk = RiskAssessment::Moderate;

    if ratio < UNDERTREATED_RATIO {
        if chart_peak < 0.8 * target.max_safe_conc {
            dose = (dose * 1.3).min(0.9 * target.max_safe_conc);
            confidence = 0.85;
            risk = RiskAssessment::Low;
            debug!("Undertreated (ratio {:.2}): raising dose to {:.2}", ratio, dose);
        } else {
            interval = (interval * 0.75).max(MIN_INTERVAL);
            confidence = 0.75;
            risk = RiskAssessment::Moderate;
            debug!("Undertreated near safety limit (ratio {:.2}): shortening interval to {:.2}h", ratio, interval);
        }
    } else if ratio > OVERTREATED_RATIO {
        if chart_trough > 1.5 * target.min_effective_conc {
            interval = (interval * 1.25).min(MAX_INTERVAL);
            confidence = 0.8;
            risk = RiskAssessment::Low;
            debug!("Overtreated (ratio {:.2}): extending interval to {:.2}h", ratio, interval);
        } else if chart_peak > 0.9 * target.max_safe_conc {
            dose = (dose * 0.85).max(2.0 * target.min_effective_conc);
            confidence = 0.8;
            risk = RiskAssessment::Low;
            debug!("Overtreated near safety limit (ratio {:.2}): lowering dose to {:.2}", ratio, dose);
        }
    } else {
        debug!("Time above MIC within target band (ratio {:.2})", ratio);
    }

    if chart_trough < target.min_effective_conc {
        risk = RiskAssessment::Subtherapeutic;
        confidence = 0.6;
    }
    // Evaluated last so toxicity wins when both limits are breached.
    if chart_peak > target.max_safe_conc {
        risk = RiskAssessment::Toxicity;
        confidence = 0.5;
    }

    // Single-compartment assumption: the infusion peak equals the dose.
    let projection = InfusionProfile::new(&drug.with_interval_and_dose(interval, dose));
    let mic = if current.mean_mic.is_finite() {
        current.mean_mic
    } else {
        pd.baseline_mic()
    };
    let expected_percent = projection.percent_of_cycle_above(mic, PROJECTION_POINTS).min(100.0);

    let recommendation = OptimizationRecommendation {
        recommended_interval: interval,
        recommended_dose: dose,
        expected_percent_time_above_mic: expected_percent,
        expected_peak_conc: projection.peak(),
        expected_trough_conc: projection.trough(),
        risk_assessment: risk,
        confidence,
    };
    info!(
        "Recommendation: every {:.2}h at {:.2} μg/mL peak, risk {}, confidence {:.2}",
        recommendation.recommended_interval,
        recommendation.recommended_dose,
        recommendation.risk_assessment,
        recommendation.confidence
    );

    Ok(recommendation)
}
