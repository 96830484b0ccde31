//! Report error types.
//!
//! This module provides structured error types for report construction
//! using `thiserror` for derivation.

use thiserror::Error;

/// Errors that can occur while building a comparison report.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReportError {
    /// Price series of different lengths.
    #[error("Length mismatch: market {market}, black_scholes {black_scholes}, heston {heston}")]
    LengthMismatch {
        /// Market series length
        market: usize,
        /// Black-Scholes series length
        black_scholes: usize,
        /// Heston series length
        heston: usize,
    },

    /// No pricing result for an observation.
    #[error("No {model} result for instrument {instrument_id}")]
    MissingResult {
        /// Instrument without a result
        instrument_id: String,
        /// Model whose result is missing
        model: String,
    },

    /// Invalid report configuration.
    #[error("Invalid report configuration: {0}")]
    InvalidConfig(String),
}
