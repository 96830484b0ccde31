//! Heston calibration.
//!
//! - `transform`: unconstrained parameterisation (log for positive
//!   parameters, tanh for ρ)
//! - `weights`: instrument weighting schemes and error metrics
//! - `result`: fitted parameters, residuals and diagnostics
//! - `heston`: the calibrator with seeded restarts

pub mod heston;
pub mod result;
pub mod transform;
pub mod weights;

pub use heston::{HestonCalibrator, HestonCalibratorConfig, Optimiser, PENALTY_SCALE};
pub use result::{CalibrationDiagnostics, CalibrationResult, InstrumentResidual};
pub use weights::{ErrorMetric, WeightingScheme};
