//! Per-instrument pricing results.
//!
//! A [`PricingResult`] always comes back, even when pricing failed: the
//! error is carried as a flag and the price is NaN, so one bad instrument
//! never aborts a batch.

use std::fmt;

use pricer_core::types::PricingError;

/// Model that produced a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModelTag {
    /// Closed-form Black-Scholes.
    BlackScholes,
    /// Semi-analytic Heston.
    Heston,
}

impl ModelTag {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTag::BlackScholes => "black_scholes",
            ModelTag::Heston => "heston",
        }
    }
}

impl fmt::Display for ModelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numerical diagnostics from a Heston price.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingDiagnostics {
    /// Integrand evaluations across both probabilities.
    pub evaluations: usize,
    /// Sum of the absolute integration error estimates.
    pub error_estimate: f64,
    /// In-the-money probability under the share measure.
    pub p1: f64,
    /// In-the-money probability under the risk-neutral measure.
    pub p2: f64,
    /// Truncation point of the Fourier integrals.
    pub upper_limit: f64,
}

/// Price of one instrument under one model.
///
/// # Examples
/// ```
/// use pricer_pricing::{ModelTag, PricingResult};
///
/// let ok = PricingResult::ok("BTC-29MAR24-52000-C", ModelTag::Heston, 7_050.0);
/// assert!(ok.is_ok());
/// assert_eq!(ok.model.to_string(), "heston");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Venue instrument identifier.
    pub instrument_id: String,
    /// Producing model.
    pub model: ModelTag,
    /// Model price in quote currency. NaN when flagged.
    pub price: f64,
    /// Set when pricing failed.
    pub error: Option<PricingError>,
    /// Integration diagnostics, Heston only.
    pub diagnostics: Option<PricingDiagnostics>,
}

impl PricingResult {
    /// Successful price without diagnostics.
    pub fn ok(instrument_id: impl Into<String>, model: ModelTag, price: f64) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            model,
            price,
            error: None,
            diagnostics: None,
        }
    }

    /// Failed price. The price is NaN.
    pub fn flagged(instrument_id: impl Into<String>, model: ModelTag, error: PricingError) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            model,
            price: f64::NAN,
            error: Some(error),
            diagnostics: None,
        }
    }

    /// Attach diagnostics.
    pub fn with_diagnostics(mut self, diagnostics: PricingDiagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// True when no error flag is set.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Price when successful.
    pub fn value(&self) -> Option<f64> {
        if self.is_ok() {
            Some(self.price)
        } else {
            None
        }
    }
}
