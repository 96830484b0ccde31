//! # Smile Fit Demo
//!
//! Calibrates a Heston model to a crypto option chain and compares it with
//! Black-Scholes on the same instruments.
//!
//! ## Workflow
//!
//! 1. Load venue quotes from CSV, or synthesise a noisy Heston chain
//! 2. Filter the calibration universe (expiry, moneyness, priced)
//! 3. Calibrate Heston with restarts
//! 4. Price the universe under both models in parallel
//! 5. Summarise errors and write the report as JSON
//!
//! No network or database access: quotes come from files.

pub mod config;
pub mod data;
pub mod error;
pub mod workflow;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigError, SmileFitConfig, SyntheticConfig, DEFAULT_CONFIG_PATH};
    pub use crate::data::{load_quotes, read_quotes, synthesize, QuoteRecord};
    pub use crate::error::DemoError;
    pub use crate::workflow::{SmileFitOutcome, SmileFitWorkflow};
}
