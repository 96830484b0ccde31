//! Calibration error types.
//!
//! Every variant is fatal for the calibration run that raised it.
//! Per-instrument pricing failures never surface here; they are dropped or
//! penalised inside the objective.

use pricer_core::types::{PricingError, SolverError};
use thiserror::Error;

/// Errors that abort a Heston calibration.
///
/// # Examples
///
/// ```
/// use pricer_optimiser::CalibrationError;
///
/// let err = CalibrationError::MissingMarketPrice {
///     instrument_id: "BTC-29MAR24-52000-C".to_string(),
/// };
/// assert!(format!("{}", err).contains("BTC-29MAR24-52000-C"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// No observations were supplied.
    #[error("No observations to calibrate against")]
    EmptyObservations,

    /// An observation failed validation.
    #[error("Invalid observation {instrument_id}: {source}")]
    InvalidObservation {
        /// Offending instrument
        instrument_id: String,
        /// Validation failure
        #[source]
        source: PricingError,
    },

    /// An observation has no market price to fit.
    #[error("Observation {instrument_id} has no market price")]
    MissingMarketPrice {
        /// Offending instrument
        instrument_id: String,
    },

    /// The initial guess lies outside the parameter domain.
    #[error("Invalid initial guess: {0}")]
    InvalidInitialGuess(#[source] PricingError),

    /// Every instrument failed to price at the initial guess.
    #[error("No instrument could be priced at the initial guess ({failed} failed)")]
    NoUsableInstruments {
        /// Number of instruments that failed
        failed: usize,
    },

    /// Inconsistent calibrator configuration.
    #[error("Invalid calibration configuration: {0}")]
    InvalidConfig(String),

    /// Every optimiser run failed.
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

impl CalibrationError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        CalibrationError::InvalidConfig(message.into())
    }

    /// Check if this is a recoverable error.
    ///
    /// Recoverable errors might succeed with a different initial guess or
    /// optimiser settings; the rest need different input data.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CalibrationError::Solver(_)
                | CalibrationError::InvalidInitialGuess(_)
                | CalibrationError::NoUsableInstruments { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_observation_display() {
        let err = CalibrationError::InvalidObservation {
            instrument_id: "ETH-1".to_string(),
            source: PricingError::invalid_input("strike must be positive"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("ETH-1"));
        assert!(msg.contains("strike must be positive"));
    }

    #[test]
    fn test_from_solver_error() {
        let err: CalibrationError = SolverError::InvalidConfig("bad".to_string()).into();
        assert!(matches!(err, CalibrationError::Solver(_)));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(CalibrationError::NoUsableInstruments { failed: 3 }.is_recoverable());
        assert!(!CalibrationError::EmptyObservations.is_recoverable());
        assert!(!CalibrationError::invalid_config("x").is_recoverable());
    }
}
