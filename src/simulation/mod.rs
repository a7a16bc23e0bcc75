pub mod auc;
pub mod results;
pub mod runs;
pub mod summary;

use log::{debug, info, warn};
use crate::config::SimulationConfig;
use crate::dosing::{regimen_violations, DosingRegimen};
use crate::error::ValidationError;
use crate::models::{InfusionProfile, PDParameters};

pub use auc::trapezoidal_auc;
pub use results::{CycleMetrics, SimulationOutput, TimeSeriesSample};
pub use runs::{run_tracked, RunCoordinator, RunToken};
pub use summary::SimulationSummary;

/// Collects every precondition violation for a run.
pub fn run_violations(
    drug: &DosingRegimen,
    inhibitor: &DosingRegimen,
    pd: &PDParameters,
    sim: &SimulationConfig,
) -> Vec<String> {
    let mut messages = regimen_violations(drug, inhibitor);
    messages.extend(pd.violations());
    messages.extend(sim.violations());
    messages
}

/// Simulates drug and inhibitor profiles over `sim.num_cycles` drug cycles.
///
/// The grid runs from 0 to `num_cycles · drug.dosing_interval` inclusive.
/// Samples are bucketed into drug cycles by floor division; the sample
/// landing exactly on the horizon belongs to cycle `num_cycles`, so it is
/// kept in the time series but left out of the per-cycle metrics.
///
/// Drug and inhibitor are evaluated against their own regimens and need not
/// share a cycle length.
pub fn run(
    drug: &DosingRegimen,
    inhibitor: &DosingRegimen,
    pd: &PDParameters,
    sim: &SimulationConfig,
) -> Result<SimulationOutput, ValidationError> {
    let violations = run_violations(drug, inhibitor, pd, sim);
    if !violations.is_empty() {
        warn!("Simulation rejected: {}", violations.join("; "));
        return Err(ValidationError::new(violations));
    }

    let num_cycles = sim.num_cycles as usize;
    let total_time = sim.num_cycles as f64 * drug.dosing_interval;
    info!(
        "Starting simulation: {} cycles of {}h, step {}h",
        num_cycles, drug.dosing_interval, sim.time_step
    );

    let drug_profile = InfusionProfile::new(drug);
    let inhibitor_profile = InfusionProfile::new(inhibitor);

    let mut time_series = Vec::with_capacity((total_time / sim.time_step) as usize + 1);
    let mut cycles: Vec<CycleMetrics> = (1..=num_cycles).map(CycleMetrics::empty).collect();

    // t = i·step rather than t += step, so rounding error never accumulates
    // across the grid.
    let mut step = 0u64;
    loop {
        let t = step as f64 * sim.time_step;
        if t > total_time {
            break;
        }

        let drug_conc = drug_profile.concentration_at(t);
        let inhibitor_conc = inhibitor_profile.concentration_at(t);
        let sample = TimeSeriesSample {
            time: t,
            drug_conc,
            inhibitor_conc,
            mic: pd.dynamic_mic(inhibitor_conc),
        };

        let cycle = drug_profile.cycle_index(t);
        if let Some(metrics) = cycles.get_mut(cycle) {
            metrics.push(t - cycle as f64 * drug.dosing_interval, &sample);
        }

        time_series.push(sample);
        step += 1;
    }

    for metrics in &mut cycles {
        metrics.finalize();
        debug!(
            "Cycle {}: drug AUC {:.3}, inhibitor AUC {:.3}, T>MIC {:.1}% over {} samples",
            metrics.cycle_index,
            metrics.drug_auc,
            metrics.inhibitor_auc,
            metrics.percent_time_above_mic,
            metrics.sample_count()
        );
    }

    let summary = SimulationSummary::from_series(&time_series, &drug_profile, &inhibitor_profile);
    info!(
        "Simulation completed: {} samples, T>MIC {:.1}%",
        time_series.len(),
        summary.percent_time_above_mic
    );

    Ok(SimulationOutput {
        summary,
        time_series,
        cycles,
    })
}
