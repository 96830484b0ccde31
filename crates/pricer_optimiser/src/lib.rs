//! # pricer_optimiser
//!
//! Heston model calibration against market option prices.
//!
//! This crate sits above the pricing engine (L3), solving the inverse
//! problem: which Heston parameters reproduce the observed premia.
//!
//! ## Architecture Position
//!
//! Depends on `pricer_core` (L1: observations, solvers), `pricer_models`
//! (L2: Heston parameters) and `pricer_pricing` (L3: Heston pricer).
//!
//! ## Modules
//!
//! - `calibration`: parameter transforms, weighting, the calibrator and its
//!   result types
//!
//! ## Example
//!
//! ```rust,no_run
//! use pricer_core::types::{MarketObservation, ObservationFilter};
//! use pricer_models::models::HestonParams;
//! use pricer_optimiser::calibration::{HestonCalibrator, HestonCalibratorConfig};
//!
//! # let quotes: Vec<MarketObservation> = Vec::new();
//! let universe = ObservationFilter::default().apply(&quotes);
//! let calibrator = HestonCalibrator::new(HestonCalibratorConfig::default().with_max_restarts(2));
//! let result = calibrator.calibrate(&universe, HestonParams::default())?;
//! assert!(result.params.validate().is_ok());
//! # Ok::<(), pricer_optimiser::CalibrationError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` (default): run restarts on the Rayon pool
//! - `serde` (default): serialisation of configurations and results

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calibration;

mod error;

pub use error::CalibrationError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::calibration::*;
    pub use crate::CalibrationError;
}
