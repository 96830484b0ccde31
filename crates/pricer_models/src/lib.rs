//! # Pricer Models (L2: Model Layer)
//!
//! Closed-form and semi-analytic building blocks for option pricing.
//!
//! This crate provides:
//! - Black-Scholes prices, Greeks and implied volatility (`analytical`)
//! - Heston parameters with domain validation and the Feller check (`models::heston`)
//! - The Heston characteristic function in the branch-cut safe formulation
//!   (`models::characteristic`)
//!
//! Numerical integration of the characteristic function into prices lives in
//! `pricer_pricing`; calibration lives in `pricer_optimiser`.
//!
//! ## Design Principles
//!
//! - **Validate once**: parameter checks happen at construction, inner loops
//!   do not re-check
//! - **Errors as values**: invalid inputs surface as `PricingError`, never panics

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod models;
