//! Contract, observation and error types.
//!
//! This module provides:
//! - `option`: European option terms (`OptionContract`, `OptionType`, `Expiry`)
//! - `observation`: Market observations and the calibration universe filter
//! - `error`: Structured error types for pricing and solver operations
//!
//! # Re-exports
//!
//! Commonly used types are re-exported at this module level.

pub mod error;
pub mod observation;
pub mod option;

// Re-export commonly used types at module level
pub use error::{PricingError, SolverError};
pub use observation::{MarketObservation, ObservationFilter, PriceQuotation};
pub use option::{Expiry, OptionContract, OptionType, SECONDS_PER_YEAR};
