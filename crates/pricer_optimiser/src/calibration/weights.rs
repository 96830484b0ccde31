//! Instrument weighting and error metrics for the calibration objective.

use pricer_core::types::MarketObservation;
use pricer_models::analytical::BlackScholes;

/// Smallest weight any instrument receives.
const MIN_WEIGHT: f64 = 1e-12;

/// How each instrument's error is weighted.
///
/// # Variants
///
/// - `Uniform`: every instrument counts the same (default)
/// - `Relative`: 1 / market², i.e. fitting relative errors
/// - `Vega`: Black-Scholes vega of the observation
/// - `InverseSpread`: 1 / bid-ask spread, uniform where no spread is quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeightingScheme {
    /// Equal weights.
    #[default]
    Uniform,
    /// Inverse squared market price.
    Relative,
    /// Black-Scholes vega.
    Vega,
    /// Inverse bid-ask spread.
    InverseSpread,
}

impl WeightingScheme {
    /// Weight for one observation.
    ///
    /// `market` is the premium in quote currency. `fallback_volatility`
    /// feeds the vega when the observation has no implied volatility.
    pub fn weight(
        &self,
        observation: &MarketObservation,
        market: f64,
        time_to_expiry: f64,
        fallback_volatility: f64,
    ) -> f64 {
        let w = match self {
            WeightingScheme::Uniform => 1.0,
            WeightingScheme::Relative => 1.0 / (market * market),
            WeightingScheme::Vega => {
                let vol = observation
                    .implied_volatility
                    .unwrap_or(fallback_volatility);
                BlackScholes::new(observation.spot, observation.rate, vol)
                    .map(|bs| bs.vega(observation.contract.strike, time_to_expiry))
                    .unwrap_or(1.0)
            }
            WeightingScheme::InverseSpread => match observation.bid_ask_spread_in_quote() {
                Some(spread) if spread > 0.0 => 1.0 / spread,
                _ => 1.0,
            },
        };
        if w.is_finite() {
            w.max(MIN_WEIGHT)
        } else {
            // zero market price or zero spread
            1.0 / MIN_WEIGHT
        }
    }
}

/// Per-instrument loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorMetric {
    /// w · (model - market)²
    #[default]
    Squared,
    /// w · |model - market|
    Absolute,
}

impl ErrorMetric {
    /// Weighted loss of one instrument.
    #[inline]
    pub fn loss(&self, weight: f64, error: f64) -> f64 {
        match self {
            ErrorMetric::Squared => weight * error * error,
            ErrorMetric::Absolute => weight * error.abs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_core::types::{OptionContract, OptionType, PriceQuotation};

    fn obs() -> MarketObservation {
        MarketObservation::new(
            "BTC-1",
            "BTC",
            OptionContract::new(50_000.0, 0.5, OptionType::Call),
            50_000.0,
            0.0,
        )
        .with_market_price(0.1)
        .with_quotation(PriceQuotation::Underlying)
    }

    #[test]
    fn test_uniform_and_relative() {
        let o = obs();
        assert_eq!(WeightingScheme::Uniform.weight(&o, 5_000.0, 0.5, 0.8), 1.0);
        assert_relative_eq!(
            WeightingScheme::Relative.weight(&o, 5_000.0, 0.5, 0.8),
            1.0 / 25e6,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_vega_uses_fallback_volatility() {
        let o = obs();
        let expected = BlackScholes::new(50_000.0, 0.0, 0.8).unwrap().vega(50_000.0, 0.5);
        assert_relative_eq!(
            WeightingScheme::Vega.weight(&o, 5_000.0, 0.5, 0.8),
            expected,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_inverse_spread_in_quote_currency() {
        let with_spread = obs().with_bid_ask_spread(0.002);
        assert_relative_eq!(
            WeightingScheme::InverseSpread.weight(&with_spread, 5_000.0, 0.5, 0.8),
            1.0 / 100.0,
            max_relative = 1e-12
        );
        assert_eq!(WeightingScheme::InverseSpread.weight(&obs(), 5_000.0, 0.5, 0.8), 1.0);
    }

    #[test]
    fn test_zero_market_price_stays_finite() {
        let w = WeightingScheme::Relative.weight(&obs(), 0.0, 0.5, 0.8);
        assert!(w.is_finite());
    }

    #[test]
    fn test_metric_loss() {
        assert_eq!(ErrorMetric::Squared.loss(2.0, -3.0), 18.0);
        assert_eq!(ErrorMetric::Absolute.loss(2.0, -3.0), 6.0);
    }
}
