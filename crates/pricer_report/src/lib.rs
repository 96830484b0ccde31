//! # pricer_report
//!
//! Judges model fit: per-instrument errors of Black-Scholes and Heston
//! against market prices, summary statistics and chart-ready series.
//!
//! ## Modules
//!
//! - `comparison`: `ComparisonReport` with MAE, bias and per-instrument errors
//! - `statistics`: descriptive statistics and linear-interpolation quantiles
//! - `chart`: scatter, strike and MAE bar series for plotting
//!
//! ## Example
//!
//! ```rust
//! use pricer_report::{summarize_with, ReportConfig};
//!
//! let market = [120.0, 80.0, 45.0, 20.0];
//! let bs = [118.0, 83.0, 44.0, 25.0];
//! let heston = [121.0, 79.5, 46.0, 21.0];
//!
//! let report = summarize_with(&market, &bs, &heston, &ReportConfig::default()).unwrap();
//! assert_eq!(report.better_model(), Some("heston"));
//! assert_eq!(report.stats_heston.count, 4);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod chart;
pub mod comparison;
pub mod error;
pub mod statistics;

pub use chart::{Bar, ChartData, Point, Series};
pub use comparison::{
    summarize, summarize_results, summarize_with, ComparisonReport, InstrumentComparison,
    ReportConfig,
};
pub use error::ReportError;
