//! Error types for analytical pricing operations.
//!
//! This module provides:
//! - `AnalyticalError`: Input errors specific to closed-form models

use pricer_core::types::PricingError;
use thiserror::Error;

/// Analytical pricing errors.
///
/// Every variant is an input error; the conversion into [`PricingError`]
/// maps them all onto `PricingError::InvalidInput`.
///
/// # Examples
/// ```
/// use pricer_models::analytical::AnalyticalError;
///
/// let err = AnalyticalError::InvalidVolatility { volatility: -0.2 };
/// assert!(format!("{}", err).contains("volatility"));
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalyticalError {
    /// Negative volatility.
    #[error("Invalid volatility: σ = {volatility}")]
    InvalidVolatility {
        /// The invalid volatility value
        volatility: f64,
    },

    /// Non-positive spot price.
    #[error("Invalid spot price: S = {spot}")]
    InvalidSpot {
        /// The invalid spot price value
        spot: f64,
    },

    /// Non-positive strike.
    #[error("Invalid strike: K = {strike}")]
    InvalidStrike {
        /// The invalid strike value
        strike: f64,
    },

    /// Negative time to expiry.
    #[error("Invalid time to expiry: T = {expiry}")]
    InvalidExpiry {
        /// The invalid expiry value
        expiry: f64,
    },

    /// Premium outside the range Black-Scholes can reach.
    #[error("Price {price} outside attainable range [{lower}, {upper}]")]
    PriceOutOfBounds {
        /// The premium being inverted
        price: f64,
        /// Price at the lowest searched volatility
        lower: f64,
        /// Price at the highest searched volatility
        upper: f64,
    },

    /// NaN or infinite input.
    #[error("Non-finite input: {name}")]
    NonFinite {
        /// Name of the offending input
        name: String,
    },
}

impl From<AnalyticalError> for PricingError {
    fn from(err: AnalyticalError) -> Self {
        PricingError::InvalidInput(err.to_string())
    }
}
