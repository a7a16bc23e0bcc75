use serde::{Deserialize, Serialize};
use super::auc::trapezoidal_auc;
use super::summary::SimulationSummary;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesSample {
    pub time: f64,
    pub drug_conc: f64,
    pub inhibitor_conc: f64,
    pub mic: f64,
}

impl TimeSeriesSample {
    pub fn above_mic(&self) -> bool {
        self.drug_conc >= self.mic
    }
}

/// Metrics for one drug dosing cycle, with the cycle-local samples they
/// were derived from. `times` restarts at zero for each cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleMetrics {
    pub cycle_index: usize, // 1-based
    pub drug_auc: f64,
    pub inhibitor_auc: f64,
    pub exposure_ratio: f64,
    pub percent_time_above_mic: f64,
    pub times: Vec<f64>,
    pub drug_concentrations: Vec<f64>,
    pub inhibitor_concentrations: Vec<f64>,
    pub mics: Vec<f64>,
}

impl CycleMetrics {
    pub(crate) fn empty(cycle_index: usize) -> Self {
        Self {
            cycle_index,
            drug_auc: 0.0,
            inhibitor_auc: 0.0,
            exposure_ratio: 0.0,
            percent_time_above_mic: 0.0,
            times: Vec::new(),
            drug_concentrations: Vec::new(),
            inhibitor_concentrations: Vec::new(),
            mics: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, cycle_time: f64, sample: &TimeSeriesSample) {
        self.times.push(cycle_time);
        self.drug_concentrations.push(sample.drug_conc);
        self.inhibitor_concentrations.push(sample.inhibitor_conc);
        self.mics.push(sample.mic);
    }

    /// Fills in the scalar metrics from the collected samples.
    pub(crate) fn finalize(&mut self) {
        self.drug_auc = trapezoidal_auc(&self.times, &self.drug_concentrations);
        self.inhibitor_auc = trapezoidal_auc(&self.times, &self.inhibitor_concentrations);
        self.exposure_ratio = self.drug_auc / self.inhibitor_auc;

        let above = self
            .drug_concentrations
            .iter()
            .zip(&self.mics)
            .filter(|(drug, mic)| drug >= mic)
            .count();
        self.percent_time_above_mic = percent_of(above, self.times.len());
    }

    pub fn sample_count(&self) -> usize {
        self.times.len()
    }
}

/// Everything a single run produces. Built whole or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub summary: SimulationSummary,
    pub time_series: Vec<TimeSeriesSample>,
    pub cycles: Vec<CycleMetrics>,
}

impl SimulationOutput {
    /// Highest drug concentration on the simulated grid.
    pub fn chart_peak(&self) -> f64 {
        self.summary.drug_max_conc
    }

    /// Lowest drug concentration on the simulated grid.
    pub fn chart_trough(&self) -> f64 {
        self.time_series
            .iter()
            .map(|s| s.drug_conc)
            .fold(f64::INFINITY, f64::min)
    }
}

/// `100 · count / total`, zero for an empty denominator.
pub(crate) fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(time: f64, drug_conc: f64, mic: f64) -> TimeSeriesSample {
        TimeSeriesSample {
            time,
            drug_conc,
            inhibitor_conc: 1.0,
            mic,
        }
    }

    #[test]
    fn test_above_mic_inclusive() {
        assert!(sample(0.0, 4.0, 4.0).above_mic());
        assert!(!sample(0.0, 3.99, 4.0).above_mic());
    }

    #[test]
    fn test_cycle_finalize() {
        let mut cycle = CycleMetrics::empty(1);
        cycle.push(0.0, &sample(24.0, 2.0, 4.0));
        cycle.push(1.0, &sample(25.0, 6.0, 4.0));
        cycle.push(2.0, &sample(26.0, 4.0, 4.0));
        cycle.push(3.0, &sample(27.0, 3.0, 4.0));
        cycle.finalize();

        assert_relative_eq!(cycle.drug_auc, 4.0 + 5.0 + 3.5, epsilon = 1e-12);
        assert_relative_eq!(cycle.inhibitor_auc, 3.0, epsilon = 1e-12);
        assert_relative_eq!(cycle.exposure_ratio, 12.5 / 3.0, epsilon = 1e-12);
        assert_eq!(cycle.percent_time_above_mic, 50.0);
        assert_eq!(cycle.sample_count(), 4);
    }

    #[test]
    fn test_zero_inhibitor_auc_propagates() {
        let mut cycle = CycleMetrics::empty(1);
        let mut s = sample(0.0, 5.0, 1.0);
        s.inhibitor_conc = 0.0;
        cycle.push(0.0, &s);
        cycle.push(1.0, &s);
        cycle.finalize();
        assert!(cycle.exposure_ratio.is_infinite());
    }

    #[test]
    fn test_empty_cycle_finalize() {
        let mut cycle = CycleMetrics::empty(2);
        cycle.finalize();
        assert_eq!(cycle.drug_auc, 0.0);
        assert!(cycle.exposure_ratio.is_nan());
        assert_eq!(cycle.percent_time_above_mic, 0.0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(0, 0), 0.0);
        assert_eq!(percent_of(1, 4), 25.0);
        assert_eq!(percent_of(4, 4), 100.0);
    }
}
