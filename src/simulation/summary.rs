use serde::{Deserialize, Serialize};
use super::auc::trapezoidal_auc;
use super::results::{percent_of, TimeSeriesSample};
use crate::models::InfusionProfile;

/// Whole-horizon aggregates of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub drug_auc: f64,
    pub inhibitor_auc: f64,
    pub exposure_ratio: f64,
    pub inverse_exposure_ratio: f64,
    pub percent_time_above_mic: f64,
    pub drug_min_conc: f64,
    pub inhibitor_min_conc: f64,
    pub drug_max_conc: f64,
    pub inhibitor_max_conc: f64,
    pub mean_mic: f64,
    pub decay_constant_drug: f64,
    pub decay_constant_inhibitor: f64,
}

impl SimulationSummary {
    pub fn from_series(
        series: &[TimeSeriesSample],
        drug: &InfusionProfile,
        inhibitor: &InfusionProfile,
    ) -> Self {
        let times: Vec<f64> = series.iter().map(|s| s.time).collect();
        let drug_concs: Vec<f64> = series.iter().map(|s| s.drug_conc).collect();
        let inhibitor_concs: Vec<f64> = series.iter().map(|s| s.inhibitor_conc).collect();
        let mics: Vec<f64> = series.iter().map(|s| s.mic).collect();

        let drug_auc = trapezoidal_auc(&times, &drug_concs);
        let inhibitor_auc = trapezoidal_auc(&times, &inhibitor_concs);
        let above = series.iter().filter(|s| s.above_mic()).count();

        Self {
            drug_auc,
            inhibitor_auc,
            exposure_ratio: drug_auc / inhibitor_auc,
            inverse_exposure_ratio: inhibitor_auc / drug_auc,
            percent_time_above_mic: percent_of(above, series.len()),
            drug_min_conc: drug.trough(),
            inhibitor_min_conc: inhibitor.trough(),
            drug_max_conc: max(&drug_concs),
            inhibitor_max_conc: max(&inhibitor_concs),
            mean_mic: mean(&mics),
            decay_constant_drug: drug.decay_constant(),
            decay_constant_inhibitor: inhibitor.decay_constant(),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
