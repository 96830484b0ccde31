//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: Errors from pricing operations (input, parameter and
//!   integration failures)
//! - `SolverError`: Errors from numerical integration and optimisation

use thiserror::Error;

/// Categorised pricing errors.
///
/// Input and parameter errors are structural: they are reported as soon as a
/// call starts and are never retried. Integration failures are numerical and
/// per instrument, so batch callers flag the instrument and move on.
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::InvalidInput("strike must be positive".to_string());
/// assert_eq!(format!("{}", err), "Invalid input: strike must be positive");
/// assert!(!err.is_recoverable());
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PricingError {
    /// Malformed or out-of-domain contract or observation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model parameters outside their admissible domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Numerical integration did not converge within its budget.
    #[error(
        "Integration failure: {message} (evaluations: {evaluations}, error estimate: {error_estimate:.3e})"
    )]
    IntegrationFailure {
        /// Description of the failure
        message: String,
        /// Integrand evaluations spent before giving up
        evaluations: usize,
        /// Last absolute error estimate
        error_estimate: f64,
    },
}

impl PricingError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        PricingError::InvalidInput(message.into())
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        PricingError::InvalidParameter(message.into())
    }

    /// Create an integration failure from a solver error.
    pub fn integration_failure(source: &SolverError) -> Self {
        let (evaluations, error_estimate) = match source {
            SolverError::NotConverged {
                evaluations,
                error_estimate,
                ..
            } => (*evaluations, *error_estimate),
            SolverError::NonFinite { evaluations, .. } => (*evaluations, f64::NAN),
            _ => (0, f64::NAN),
        };
        PricingError::IntegrationFailure {
            message: source.to_string(),
            evaluations,
            error_estimate,
        }
    }

    /// Whether the failure is numerical and isolated to one instrument.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PricingError::IntegrationFailure { .. })
    }
}

/// Numerical solver errors.
///
/// # Examples
/// ```
/// use pricer_core::types::SolverError;
///
/// let err = SolverError::NotConverged { evaluations: 450, estimate: 0.4, error_estimate: 1e-3 };
/// assert!(format!("{}", err).contains("450 evaluations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// Tolerance not reached before the budget ran out.
    #[error("Failed to converge after {evaluations} evaluations (estimate {estimate}, error {error_estimate:.3e})")]
    NotConverged {
        /// Function evaluations performed
        evaluations: usize,
        /// Best estimate at termination
        estimate: f64,
        /// Absolute error estimate at termination
        error_estimate: f64,
    },

    /// The function returned NaN or infinity.
    #[error("Non-finite function value at x = {x}")]
    NonFinite {
        /// Abscissa of the offending evaluation
        x: f64,
        /// Function evaluations performed
        evaluations: usize,
    },

    /// Invalid solver configuration or interval.
    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}
