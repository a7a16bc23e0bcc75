use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::config::Config;
use crate::error::PkpdResult;
use crate::optimizer::OptimizationRecommendation;
use crate::simulation::{CycleMetrics, SimulationOutput, SimulationSummary, TimeSeriesSample};

/// Parameters and results of one run bundled for JSON export.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub generated_at: DateTime<Utc>,
    pub parameters: &'a Config,
    pub summary: &'a SimulationSummary,
    pub cycles: &'a [CycleMetrics],
    pub time_series: &'a [TimeSeriesSample],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<&'a OptimizationRecommendation>,
}

pub fn save_results<P: AsRef<Path>>(
    output: &SimulationOutput,
    config: &Config,
    recommendation: Option<&OptimizationRecommendation>,
    output_dir: P,
) -> PkpdResult<()> {
    let output_path = output_dir.as_ref();
    std::fs::create_dir_all(output_path)?;

    // Save concentration-time data
    save_time_series(&output.time_series, output_path.join("time_series.csv"))?;
    save_cycle_metrics(&output.cycles, output_path.join("cycle_metrics.csv"))?;

    // Save parameters and results as one JSON document
    let snapshot = Snapshot {
        generated_at: Utc::now(),
        parameters: config,
        summary: &output.summary,
        cycles: &output.cycles,
        time_series: &output.time_series,
        recommendation,
    };
    save_json(&snapshot, output_path.join("simulation_snapshot.json"))?;

    if let Some(recommendation) = recommendation {
        save_json(recommendation, output_path.join("recommendation.json"))?;
    }

    generate_report(output, config, recommendation, output_path)?;

    info!("All results saved to {:?}", output_path);
    Ok(())
}

pub fn save_time_series<P: AsRef<Path>>(series: &[TimeSeriesSample], path: P) -> PkpdResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    // Write header
    writer.write_record(["time", "drug", "inhibitor", "mic"])?;

    // Write data
    for sample in series {
        writer.write_record(&[
            sample.time.to_string(),
            sample.drug_conc.to_string(),
            sample.inhibitor_conc.to_string(),
            sample.mic.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn save_cycle_metrics<P: AsRef<Path>>(cycles: &[CycleMetrics], path: P) -> PkpdResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    // Write header
    writer.write_record([
        "cycle",
        "drug_auc",
        "inhibitor_auc",
        "exposure_ratio",
        "percent_time_above_mic",
    ])?;

    // Write data
    for cycle in cycles {
        writer.write_record(&[
            cycle.cycle_index.to_string(),
            cycle.drug_auc.to_string(),
            cycle.inhibitor_auc.to_string(),
            cycle.exposure_ratio.to_string(),
            cycle.percent_time_above_mic.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> PkpdResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

/// Writes `simulation_report.md` summarising the run.
pub fn generate_report<P: AsRef<Path>>(
    output: &SimulationOutput,
    config: &Config,
    recommendation: Option<&OptimizationRecommendation>,
    output_dir: P,
) -> PkpdResult<()> {
    let report_path = output_dir.as_ref().join("simulation_report.md");
    let summary = &output.summary;

    // One table row per dosing cycle
    let mut cycle_rows = String::new();
    for cycle in &output.cycles {
        cycle_rows.push_str(&format!(
            "| {} | {:.2} | {:.2} | {:.3} | {:.1} |\n",
            cycle.cycle_index,
            cycle.drug_auc,
            cycle.inhibitor_auc,
            cycle.exposure_ratio,
            cycle.percent_time_above_mic
        ));
    }

    let recommendation_section = match recommendation {
        Some(rec) => format!(
            r#"
## Dosing Recommendation
- **Interval**: {:.2} h
- **Dose (peak)**: {:.2} μg/mL
- **Expected peak / trough**: {:.2} / {:.2} μg/mL
- **Expected T>MIC**: {:.1}%
- **Risk**: {}
- **Confidence**: {:.2}
"#,
            rec.recommended_interval,
            rec.recommended_dose,
            rec.expected_peak_conc,
            rec.expected_trough_conc,
            rec.expected_percent_time_above_mic,
            rec.risk_assessment,
            rec.confidence
        ),
        None => String::new(),
    };

    let report_content = format!(
        r#"# Drug/Inhibitor PK/PD Simulation Report

## Simulation Overview
- **Cycles**: {}
- **Time step**: {} h
- **Samples**: {}

## Regimens
| | Interval (h) | Infusion (h) | Half-life (h) | Peak (μg/mL) |
|---|---|---|---|---|
| Drug | {} | {} | {} | {} |
| Inhibitor | {} | {} | {} | {} |

## Whole-Horizon Metrics
- **Drug AUC**: {:.2} μg·h/mL
- **Inhibitor AUC**: {:.2} μg·h/mL
- **Exposure ratio (drug/inhibitor)**: {:.3}
- **T>MIC**: {:.1}%
- **Mean MIC**: {:.3} μg/mL
- **Drug trough / peak**: {:.3} / {:.3} μg/mL

## Per-Cycle Metrics
| Cycle | Drug AUC | Inhibitor AUC | Exposure ratio | T>MIC (%) |
|---|---|---|---|---|
{}{}"#,
        config.simulation.num_cycles,
        config.simulation.time_step,
        output.time_series.len(),
        config.drug.dosing_interval,
        config.drug.infusion_time,
        config.drug.half_life,
        config.drug.max_concentration,
        config.inhibitor.dosing_interval,
        config.inhibitor.infusion_time,
        config.inhibitor.half_life,
        config.inhibitor.max_concentration,
        summary.drug_auc,
        summary.inhibitor_auc,
        summary.exposure_ratio,
        summary.percent_time_above_mic,
        summary.mean_mic,
        summary.drug_min_conc,
        summary.drug_max_conc,
        cycle_rows,
        recommendation_section,
    );

    std::fs::write(report_path, report_content)?;
    Ok(())
}
