//! Optimisation solvers for model calibration.
//!
//! ## Available Solvers
//!
//! - [`LevenbergMarquardtSolver`]: Nonlinear least-squares with a
//!   forward-difference Jacobian and adaptive damping
//! - [`NelderMeadSolver`]: Derivative-free simplex minimiser for arbitrary
//!   scalar objectives
//!
//! Both solvers take an explicit iteration cap and tolerances, terminate
//! deterministically, and report `converged = false` rather than failing when
//! the cap is hit.

mod levenberg_marquardt;
mod nelder_mead;

pub use levenberg_marquardt::{LMConfig, LMResult, LevenbergMarquardtSolver};
pub use nelder_mead::{NelderMeadConfig, NelderMeadResult, NelderMeadSolver};
