//! Observation-level Black-Scholes pricing.

use pricer_core::types::{MarketObservation, PricingError};
use pricer_models::analytical::black_scholes;

use crate::result::{ModelTag, PricingResult};

/// Where the Black-Scholes volatility comes from when an observation carries
/// no implied volatility of its own.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VolatilitySource {
    /// Observation implied volatility, falling back to the batch median.
    #[default]
    Implied,
    /// One volatility for every observation.
    Fixed(f64),
}

/// Black-Scholes pricer over market observations.
///
/// # Examples
/// ```
/// use pricer_core::types::{MarketObservation, OptionContract, OptionType};
/// use pricer_pricing::BlackScholesPricer;
///
/// let obs = MarketObservation::new(
///     "BTC-29MAR24-52000-C",
///     "BTC",
///     OptionContract::new(52_000.0, 0.25, OptionType::Call),
///     50_000.0,
///     0.0,
/// )
/// .with_implied_volatility(0.8);
///
/// let result = BlackScholesPricer::default().price(&obs, None);
/// assert!((result.price - 7_122.80).abs() < 1.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackScholesPricer {
    source: VolatilitySource,
}

impl BlackScholesPricer {
    /// Create a pricer with the given volatility source.
    pub fn new(source: VolatilitySource) -> Self {
        Self { source }
    }

    /// Volatility source in use.
    pub fn source(&self) -> VolatilitySource {
        self.source
    }

    /// Volatility for `observation`.
    ///
    /// `fallback` is consulted only by [`VolatilitySource::Implied`] when the
    /// observation has no implied volatility.
    pub fn volatility_for(
        &self,
        observation: &MarketObservation,
        fallback: Option<f64>,
    ) -> Result<f64, PricingError> {
        match self.source {
            VolatilitySource::Fixed(vol) => Ok(vol),
            VolatilitySource::Implied => observation
                .implied_volatility
                .or(fallback)
                .ok_or_else(|| {
                    PricingError::invalid_input(format!(
                        "{}: no implied volatility available",
                        observation.instrument_id
                    ))
                }),
        }
    }

    /// Price one observation.
    ///
    /// Never fails; errors are returned as flagged results.
    pub fn price(&self, observation: &MarketObservation, fallback: Option<f64>) -> PricingResult {
        let id = observation.instrument_id.as_str();
        match self.try_price(observation, fallback) {
            Ok(price) => PricingResult::ok(id, ModelTag::BlackScholes, price),
            Err(err) => PricingResult::flagged(id, ModelTag::BlackScholes, err),
        }
    }

    fn try_price(
        &self,
        observation: &MarketObservation,
        fallback: Option<f64>,
    ) -> Result<f64, PricingError> {
        observation.validate()?;
        let volatility = self.volatility_for(observation, fallback)?;
        let time_to_expiry = observation.time_to_expiry()?;
        black_scholes::price(
            observation.spot,
            observation.contract.strike,
            observation.rate,
            volatility,
            time_to_expiry,
            observation.contract.option_type,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_core::types::{OptionContract, OptionType};

    fn btc_call() -> MarketObservation {
        MarketObservation::new(
            "BTC-52000-C",
            "BTC",
            OptionContract::new(52_000.0, 0.25, OptionType::Call),
            50_000.0,
            0.0,
        )
    }

    #[test]
    fn test_implied_volatility_used() {
        let result = BlackScholesPricer::default().price(&btc_call().with_implied_volatility(0.8), None);
        assert!(result.is_ok());
        assert_relative_eq!(result.price, 7_122.800_879, epsilon = 1e-3);
    }

    #[test]
    fn test_fallback_used_when_missing() {
        let pricer = BlackScholesPricer::default();
        let with_fallback = pricer.price(&btc_call(), Some(0.8));
        let explicit = pricer.price(&btc_call().with_implied_volatility(0.8), None);
        assert_eq!(with_fallback.price, explicit.price);
    }

    #[test]
    fn test_missing_volatility_flagged() {
        let result = BlackScholesPricer::default().price(&btc_call(), None);
        assert!(matches!(result.error, Some(PricingError::InvalidInput(_))));
        assert!(result.price.is_nan());
    }

    #[test]
    fn test_fixed_source_overrides_implied() {
        let pricer = BlackScholesPricer::new(VolatilitySource::Fixed(0.5));
        let obs = btc_call().with_implied_volatility(0.8);
        let expected = black_scholes::price(50_000.0, 52_000.0, 0.0, 0.5, 0.25, OptionType::Call).unwrap();
        assert_relative_eq!(pricer.price(&obs, None).price, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_fixed_volatility_flagged() {
        let pricer = BlackScholesPricer::new(VolatilitySource::Fixed(-0.1));
        let result = pricer.price(&btc_call(), None);
        assert!(matches!(result.error, Some(PricingError::InvalidInput(_))));
    }
}
