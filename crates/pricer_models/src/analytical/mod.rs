//! Analytical pricing formulas for European options.
//!
//! This module provides closed-form solutions for option pricing:
//! - Black-Scholes model for lognormal dynamics
//! - Analytical Greeks (Delta, Gamma, Vega, Theta, Rho)
//! - Standard normal CDF/PDF shared by the formulas
//!
//! ## Design Principles
//!
//! - **Generic over `T: Float`**: the model type works for `f64` and `f32`
//! - **Validated entry points**: free functions check every input and return
//!   `PricingError::InvalidInput` instead of producing NaN
//! - **Numerical Stability**: Uses erfc-based CDF for accuracy

pub mod black_scholes;
pub mod distributions;
pub mod error;

// Re-export main types at module level
pub use black_scholes::{BlackScholes, Greeks, EXPIRY_EPSILON};
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
