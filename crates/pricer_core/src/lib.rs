//! # pricer_core: Foundation for the option pricing workspace
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core is the bottom layer of the workspace, providing:
//! - Contract types: `OptionContract`, `OptionType`, `Expiry` (`types::option`)
//! - Market observations and the calibration filter (`types::observation`)
//! - Error types: `PricingError`, `SolverError` (`types::error`)
//! - Adaptive Gauss-Kronrod quadrature (`math::quadrature`)
//! - Levenberg-Marquardt and Nelder-Mead optimisers (`math::solvers`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - chrono: Absolute expiries and valuation timestamps
//! - thiserror: Error derives
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::types::{MarketObservation, ObservationFilter, OptionContract, OptionType};
//!
//! let obs = MarketObservation::new(
//!     "ETH-28JUN24-3500-P",
//!     "ETH",
//!     OptionContract::new(3_500.0, 0.5, OptionType::Put),
//!     3_200.0,
//!     0.045,
//! )
//! .with_market_price(420.0);
//!
//! assert!(obs.validate().is_ok());
//! assert!(ObservationFilter::default().accepts(&obs));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialisation for contracts, observations,
//!   errors and solver configurations

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;
