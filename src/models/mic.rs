use serde::{Deserialize, Serialize};

/// Inhibitory Hill parameters linking inhibitor exposure to drug MIC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PDParameters {
    /// Baseline log2 MIC with no inhibitor present.
    pub log2_mic0: f64,
    /// Maximum reduction in log2 MIC.
    pub imax: f64,
    pub ic50: f64,
    pub hill_coeff: f64,
}

impl PDParameters {
    pub fn new(log2_mic0: f64, imax: f64, ic50: f64, hill_coeff: f64) -> Self {
        Self {
            log2_mic0,
            imax,
            ic50,
            hill_coeff,
        }
    }

    pub fn violations(&self) -> Vec<String> {
        let mut messages = Vec::new();

        if !self.log2_mic0.is_finite() {
            messages.push("Baseline log2 MIC must be finite".to_string());
        }
        if !(self.imax >= 0.0) {
            messages.push("Imax must be non-negative".to_string());
        }
        if !(self.ic50 > 0.0) {
            messages.push("IC50 must be positive".to_string());
        }
        if !(self.hill_coeff > 0.0) {
            messages.push("Hill coefficient must be positive".to_string());
        }

        messages
    }

    /// MIC with no inhibitor, 2^log2MIC0.
    pub fn baseline_mic(&self) -> f64 {
        self.log2_mic0.exp2()
    }

    /// Fully sensitized MIC as inhibitor exposure grows without bound.
    pub fn minimum_mic(&self) -> f64 {
        (self.log2_mic0 - self.imax).exp2()
    }

    /// Fraction of Imax reached at the given inhibitor concentration.
    ///
    /// Written as `1 / (1 + (IC50/C)^γ)` so steep Hill coefficients cannot
    /// overflow both terms to infinity.
    pub fn inhibition_fraction(&self, inhibitor_conc: f64) -> f64 {
        let c = inhibitor_conc.max(0.0);
        if c == 0.0 {
            return 0.0;
        }
        1.0 / (1.0 + (self.ic50 / c).powf(self.hill_coeff))
    }

    pub fn log2_mic(&self, inhibitor_conc: f64) -> f64 {
        self.log2_mic0 - self.imax * self.inhibition_fraction(inhibitor_conc)
    }

    /// Effective MIC at the given inhibitor concentration (μg/mL).
    pub fn dynamic_mic(&self, inhibitor_conc: f64) -> f64 {
        self.log2_mic(inhibitor_conc).exp2()
    }
}
