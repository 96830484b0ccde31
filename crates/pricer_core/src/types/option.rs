//! European option contract terms.
//!
//! An [`OptionContract`] is immutable: strike, expiry and call/put flag.
//! Expiries are either a year fraction or an absolute UTC timestamp; absolute
//! expiries are converted with ACT/365 on elapsed seconds against a
//! valuation time.

use chrono::{DateTime, Utc};
use std::fmt;

use super::error::PricingError;

/// Seconds in an ACT/365 year.
pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OptionType {
    /// Right to buy at the strike.
    Call,
    /// Right to sell at the strike.
    Put,
}

impl OptionType {
    /// Intrinsic value `max(S - K, 0)` or `max(K - S, 0)`.
    #[inline]
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    /// Whether this is a call.
    #[inline]
    pub fn is_call(&self) -> bool {
        matches!(self, OptionType::Call)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

impl std::str::FromStr for OptionType {
    type Err = PricingError;

    /// Accepts `call`/`put` and the single-letter exchange codes `C`/`P`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(PricingError::invalid_input(format!(
                "unknown option type '{}'",
                other
            ))),
        }
    }
}

/// Option expiry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Expiry {
    /// Time to expiry in years.
    YearFraction(f64),
    /// Absolute expiration timestamp.
    At(DateTime<Utc>),
}

impl Expiry {
    /// Time to expiry in years.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the expiry is absolute and no valuation time is
    /// given, or the year fraction is negative or non-finite.
    pub fn year_fraction(&self, valuation_time: Option<DateTime<Utc>>) -> Result<f64, PricingError> {
        let t = match self {
            Expiry::YearFraction(t) => *t,
            Expiry::At(expiry) => {
                let now = valuation_time.ok_or_else(|| {
                    PricingError::invalid_input(
                        "absolute expiry requires a valuation time".to_string(),
                    )
                })?;
                let seconds = (*expiry - now).num_milliseconds() as f64 / 1000.0;
                seconds / SECONDS_PER_YEAR
            }
        };

        if !t.is_finite() || t < 0.0 {
            return Err(PricingError::invalid_input(format!(
                "time to expiry must be non-negative, got {}",
                t
            )));
        }
        Ok(t)
    }
}

/// Immutable European option terms.
///
/// # Examples
/// ```
/// use pricer_core::types::{OptionContract, OptionType};
///
/// let contract = OptionContract::new(52_000.0, 0.25, OptionType::Call);
/// assert!(contract.validate().is_ok());
/// assert_eq!(contract.time_to_expiry(None).unwrap(), 0.25);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionContract {
    /// Strike price (quote currency).
    pub strike: f64,
    /// Expiry.
    pub expiry: Expiry,
    /// Call or put.
    pub option_type: OptionType,
}

impl OptionContract {
    /// Contract with a year-fraction expiry.
    pub fn new(strike: f64, time_to_expiry: f64, option_type: OptionType) -> Self {
        Self {
            strike,
            expiry: Expiry::YearFraction(time_to_expiry),
            option_type,
        }
    }

    /// Contract with an absolute expiry.
    pub fn expiring_at(strike: f64, expiry: DateTime<Utc>, option_type: OptionType) -> Self {
        Self {
            strike,
            expiry: Expiry::At(expiry),
            option_type,
        }
    }

    /// Time to expiry in years.
    pub fn time_to_expiry(&self, valuation_time: Option<DateTime<Utc>>) -> Result<f64, PricingError> {
        self.expiry.year_fraction(valuation_time)
    }

    /// Check strike and, for year-fraction expiries, the expiry itself.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.strike.is_finite() || self.strike <= 0.0 {
            return Err(PricingError::invalid_input(format!(
                "strike must be positive, got {}",
                self.strike
            )));
        }
        if let Expiry::YearFraction(t) = self.expiry {
            if !t.is_finite() || t < 0.0 {
                return Err(PricingError::invalid_input(format!(
                    "time to expiry must be non-negative, got {}",
                    t
                )));
            }
        }
        Ok(())
    }
}
