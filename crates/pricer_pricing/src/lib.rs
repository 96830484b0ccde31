//! # Pricer Pricing (Layer 3: Pricing Engine)
//!
//! ## Layer 3 Role
//!
//! pricer_pricing turns market observations into model prices:
//! - Black-Scholes observation pricer with a configurable volatility source
//! - Semi-analytic Heston pricer (characteristic function + adaptive
//!   Gauss-Kronrod quadrature)
//! - Batch pricing with Rayon above a size threshold
//!
//! ## Failure Model
//!
//! Pricing never aborts a batch. Each observation yields one
//! [`PricingResult`]; invalid inputs, invalid parameters and integration
//! failures are carried as an error flag with a NaN price.
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_core::types::{MarketObservation, OptionContract, OptionType};
//! use pricer_models::models::HestonParams;
//! use pricer_pricing::{price_batch_heston, HestonPricer, ParallelConfig};
//!
//! let observations: Vec<_> = [90.0, 100.0, 110.0]
//!     .iter()
//!     .map(|&k| {
//!         MarketObservation::new(
//!             format!("SYN-{}", k),
//!             "SYN",
//!             OptionContract::new(k, 0.5, OptionType::Call),
//!             100.0,
//!             0.01,
//!         )
//!     })
//!     .collect();
//!
//! let params = HestonParams::new(0.04, 0.04, 2.0, 0.3, -0.5).unwrap();
//! let results = price_batch_heston(
//!     &HestonPricer::default(),
//!     &observations,
//!     &params,
//!     &ParallelConfig::default(),
//! );
//! assert!(results.iter().all(|r| r.is_ok()));
//! assert!(results[0].price > results[2].price);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod batch;
pub mod black_scholes;
pub mod heston;
pub mod parallel;
pub mod result;

pub use batch::{
    median_implied_volatility, price_batch, price_batch_black_scholes, price_batch_heston,
    ObservationPricer,
};
pub use black_scholes::{BlackScholesPricer, VolatilitySource};
pub use heston::{HestonPricer, HestonPricerConfig};
pub use parallel::ParallelConfig;
pub use result::{ModelTag, PricingDiagnostics, PricingResult};
