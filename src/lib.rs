//! Drug and inhibitor plasma-concentration simulation over repeated
//! intermittent infusions, with an inhibitor-driven dynamic MIC, PK/PD
//! exposure metrics, and a rule-based dosing optimizer.
//!
//! Concentrations are in μg/mL and times in hours throughout.

pub mod config;
pub mod dosing;
pub mod error;
pub mod models;
pub mod optimizer;
pub mod output;
pub mod simulation;

pub use config::{Config, SimulationConfig};
pub use dosing::DosingRegimen;
pub use error::{PkpdError, PkpdResult, ValidationError};
pub use models::PDParameters;
pub use optimizer::{optimize, OptimizationRecommendation, OptimizationTarget, RiskAssessment};
pub use simulation::{
    run, run_tracked, CycleMetrics, RunCoordinator, RunToken, SimulationOutput, SimulationSummary,
    TimeSeriesSample,
};
