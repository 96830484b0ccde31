//! Numerical primitives.
//!
//! - `quadrature`: Adaptive Gauss-Kronrod integration
//! - `solvers`: Levenberg-Marquardt and Nelder-Mead optimisers

pub mod quadrature;
pub mod solvers;
