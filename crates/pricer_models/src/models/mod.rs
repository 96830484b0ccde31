//! Stochastic volatility models.
//!
//! - `heston`: Heston parameter set, domain validation and the Feller check
//! - `characteristic`: Heston log-price characteristic function
//!
//! ## Example
//!
//! ```
//! use num_complex::Complex64;
//! use pricer_models::models::{characteristic, HestonParams};
//!
//! let params = HestonParams::new(0.04, 0.04, 2.0, 0.3, -0.5).unwrap();
//! let phi = characteristic::evaluate(Complex64::new(1.0, 0.0), &params, 100.0, 0.02, 0.5).unwrap();
//! assert!(phi.norm() <= 1.0);
//! ```

pub mod characteristic;
pub mod heston;

pub use characteristic::HestonCharacteristicFunction;
pub use heston::{HestonParams, HESTON_PARAM_COUNT};
