use std::f64::consts::LN_2;
use crate::dosing::DosingRegimen;

/// First-order elimination rate constant, k = ln(2) / t½.
pub fn decay_constant(half_life: f64) -> f64 {
    LN_2 / half_life
}

/// Concentration immediately before the next infusion starts.
pub fn trough_concentration(max_conc: f64, k: f64, interval: f64, infusion_time: f64) -> f64 {
    max_conc * (-k * (interval - infusion_time)).exp()
}

/// Linear rise from trough to peak over the infusion window.
pub fn concentration_during_infusion(
    t: f64,
    cycle_start: f64,
    infusion_time: f64,
    trough: f64,
    peak: f64,
) -> f64 {
    if infusion_time <= 0.0 {
        // Zero-length infusion behaves as a bolus: the cycle opens at peak.
        return peak;
    }
    trough + (peak - trough) * ((t - cycle_start) / infusion_time)
}

/// Exponential decline after the infusion has ended.
pub fn concentration_during_decay(t: f64, infusion_end_time: f64, peak: f64, k: f64) -> f64 {
    peak * (-k * (t - infusion_end_time)).exp()
}

/// Repeating single-compartment infusion profile.
///
/// Every cycle has the same trough-to-peak-to-trough shape; doses do not
/// accumulate across cycles. Decay constant and trough are computed once
/// at construction so the per-sample evaluation is two branches and an
/// `exp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfusionProfile {
    interval: f64,
    infusion_time: f64,
    peak: f64,
    k: f64,
    trough: f64,
}

impl InfusionProfile {
    pub fn new(regimen: &DosingRegimen) -> Self {
        let k = decay_constant(regimen.half_life);
        let trough = trough_concentration(
            regimen.max_concentration,
            k,
            regimen.dosing_interval,
            regimen.infusion_time,
        );

        Self {
            interval: regimen.dosing_interval,
            infusion_time: regimen.infusion_time,
            peak: regimen.max_concentration,
            k,
            trough,
        }
    }

    pub fn decay_constant(&self) -> f64 {
        self.k
    }

    pub fn trough(&self) -> f64 {
        self.trough
    }

    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Zero-based cycle containing absolute time `t`.
    pub fn cycle_index(&self, t: f64) -> usize {
        (t / self.interval).floor() as usize
    }

    /// Concentration at absolute time `t` (hours since first dose).
    pub fn concentration_at(&self, t: f64) -> f64 {
        let cycle_start = (t / self.interval).floor() * self.interval;
        let time_in_cycle = t % self.interval;

        if time_in_cycle <= self.infusion_time {
            concentration_during_infusion(t, cycle_start, self.infusion_time, self.trough, self.peak)
        } else {
            concentration_during_decay(t, cycle_start + self.infusion_time, self.peak, self.k)
        }
    }

    /// Concentration at time `t` within a single cycle, `0 ≤ t ≤ interval`.
    ///
    /// Unlike [`concentration_at`](Self::concentration_at) this never wraps
    /// into the next cycle, so `t = interval` evaluates the decay branch.
    pub fn concentration_in_cycle(&self, t: f64) -> f64 {
        if t <= self.infusion_time {
            concentration_during_infusion(t, 0.0, self.infusion_time, self.trough, self.peak)
        } else {
            concentration_during_decay(t, self.infusion_time, self.peak, self.k)
        }
    }

    /// Percentage of `points` equally spaced samples over `[0, interval]`
    /// at or above `mic`.
    pub fn percent_of_cycle_above(&self, mic: f64, points: usize) -> f64 {
        if points == 0 {
            return 0.0;
        }
        let spacing = if points > 1 {
            self.interval / (points - 1) as f64
        } else {
            0.0
        };

        let above = (0..points)
            .filter(|&i| self.concentration_in_cycle(i as f64 * spacing) >= mic)
            .count();
        100.0 * above as f64 / points as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn drug() -> DosingRegimen {
        DosingRegimen::new(24.0, 1.0, 6.0, 100.0)
    }

    #[test]
    fn test_decay_constant_positive_and_decreasing() {
        let mut previous = f64::INFINITY;
        for half_life in [0.5, 1.0, 2.0, 6.0, 12.0, 48.0] {
            let k = decay_constant(half_life);
            assert!(k > 0.0);
            assert!(k < previous);
            previous = k;
        }
        assert_relative_eq!(decay_constant(1.0), LN_2, epsilon = 1e-15);
    }

    #[test]
    fn test_trough_concentration() {
        let k = decay_constant(6.0);
        let trough = trough_concentration(100.0, k, 24.0, 1.0);
        // 23h of decay at t½ = 6h
        assert_relative_eq!(trough, 100.0 * 0.5_f64.powf(23.0 / 6.0), epsilon = 1e-10);
    }

    #[test]
    fn test_infusion_boundaries() {
        let trough = 5.0;
        let peak = 100.0;
        assert_eq!(concentration_during_infusion(48.0, 48.0, 1.0, trough, peak), trough);
        assert_eq!(concentration_during_infusion(49.0, 48.0, 1.0, trough, peak), peak);
        assert_eq!(concentration_during_decay(49.0, 49.0, peak, 0.1), peak);
        assert_relative_eq!(
            concentration_during_infusion(48.5, 48.0, 1.0, trough, peak),
            52.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_zero_infusion_time_is_bolus() {
        assert_eq!(concentration_during_infusion(24.0, 24.0, 0.0, 3.0, 80.0), 80.0);

        let profile = InfusionProfile::new(&DosingRegimen::new(12.0, 0.0, 4.0, 80.0));
        assert_eq!(profile.concentration_at(0.0), 80.0);
        assert_eq!(profile.concentration_at(12.0), 80.0);
        assert_relative_eq!(profile.concentration_at(4.0), 40.0, epsilon = 1e-10);
    }

    #[test]
    fn test_profile_repeats_each_cycle() {
        let profile = InfusionProfile::new(&drug());
        assert_eq!(profile.concentration_at(0.0), profile.trough());
        assert_relative_eq!(profile.concentration_at(1.0), profile.peak(), epsilon = 1e-12);
        assert_relative_eq!(
            profile.concentration_at(7.0),
            profile.concentration_at(31.0),
            epsilon = 1e-10
        );
        assert_relative_eq!(profile.concentration_at(24.0), profile.trough(), epsilon = 1e-12);
    }

    #[test]
    fn test_decay_after_infusion() {
        let profile = InfusionProfile::new(&drug());
        // one half-life after the infusion ends
        assert_relative_eq!(profile.concentration_at(7.0), 50.0, epsilon = 1e-10);
        assert_relative_eq!(profile.concentration_at(13.0), 25.0, epsilon = 1e-10);
    }

    #[test]
    fn test_cycle_index() {
        let profile = InfusionProfile::new(&drug());
        assert_eq!(profile.cycle_index(0.0), 0);
        assert_eq!(profile.cycle_index(23.9), 0);
        assert_eq!(profile.cycle_index(24.0), 1);
        assert_eq!(profile.cycle_index(72.0), 3);
    }

    #[test]
    fn test_concentration_in_cycle_end_is_trough() {
        let profile = InfusionProfile::new(&drug());
        assert_relative_eq!(profile.concentration_in_cycle(24.0), profile.trough(), epsilon = 1e-12);
        assert_eq!(profile.concentration_in_cycle(0.0), profile.trough());
    }

    #[test]
    fn test_percent_of_cycle_above() {
        let profile = InfusionProfile::new(&drug());
        assert_eq!(profile.percent_of_cycle_above(0.0, 11), 100.0);
        assert_eq!(profile.percent_of_cycle_above(1000.0, 11), 0.0);
        assert_eq!(profile.percent_of_cycle_above(1.0, 0), 0.0);
        // points at 0, 12, 24h: only t = 12h (≈28.1) clears 10
        assert_relative_eq!(profile.percent_of_cycle_above(10.0, 3), 100.0 / 3.0, epsilon = 1e-12);
    }
}
