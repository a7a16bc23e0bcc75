pub mod infusion;
pub mod mic;

pub use infusion::{
    concentration_during_decay, concentration_during_infusion, decay_constant,
    trough_concentration, InfusionProfile,
};
pub use mic::PDParameters;
