use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;

use pkpd_mic::config::Config;
use pkpd_mic::error::ValidationError;
use pkpd_mic::optimizer::optimize;
use pkpd_mic::output::save_results;
use pkpd_mic::simulation::run;

#[derive(Parser)]
#[command(name = "pkpd_mic")]
#[command(about = "Drug/inhibitor infusion simulation with dynamic MIC and dosing optimization")]
struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,

    /// Override the number of drug dosing cycles
    #[arg(long)]
    cycles: Option<u32>,

    /// Override the time step in hours
    #[arg(long)]
    time_step: Option<f64>,

    /// Recommend a revised regimen against the config's target
    #[arg(long)]
    optimize: bool,

    /// Re-run with the recommended regimen (implies --optimize)
    #[arg(long)]
    apply_recommendation: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let mut config = Config::read_file(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    // Overrides first, so a bad simulation block can be fixed from the CLI
    config.apply_overrides(cli.cycles, cli.time_step);
    if let Err(err) = config.validate() {
        report_validation(&err);
        return Err(err.into());
    }

    let output = run(&config.drug, &config.inhibitor, &config.pd, &config.simulation)?;

    let recommendation = if cli.optimize || cli.apply_recommendation {
        match &config.target {
            Some(target) => Some(optimize(
                &config.drug,
                &config.pd,
                &output.summary,
                output.chart_peak(),
                output.chart_trough(),
                target,
            )?),
            None => {
                warn!("No target in configuration; skipping optimization");
                None
            }
        }
    } else {
        None
    };

    save_results(&output, &config, recommendation.as_ref(), &cli.output)?;
    info!("Results saved to {:?}", cli.output);

    if let (true, Some(rec)) = (cli.apply_recommendation, recommendation) {
        let mut revised = config.clone();
        revised.drug = rec.apply_to(&config.drug);
        info!(
            "Re-running with interval {:.2}h, peak {:.2} μg/mL",
            revised.drug.dosing_interval, revised.drug.max_concentration
        );

        let rerun = run(&revised.drug, &revised.inhibitor, &revised.pd, &revised.simulation)?;
        let rerun_dir = cli.output.join("optimized");
        save_results(&rerun, &revised, None, &rerun_dir)?;
        info!(
            "Optimized regimen: T>MIC {:.1}% (was {:.1}%), results in {:?}",
            rerun.summary.percent_time_above_mic, output.summary.percent_time_above_mic, rerun_dir
        );
    }

    Ok(())
}

fn report_validation(err: &ValidationError) {
    for message in &err.messages {
        error!("{}", message);
    }
}
