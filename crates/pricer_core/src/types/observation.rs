//! Market observations and the calibration universe filter.
//!
//! A [`MarketObservation`] is one instrument at one timestamp: the contract,
//! the underlying spot, a risk-free rate and whatever the venue quoted
//! (premium, implied volatility, bid-ask spread).

use chrono::{DateTime, Utc};

use super::error::PricingError;
use super::option::OptionContract;

/// Currency the premium is quoted in.
///
/// Crypto venues such as Deribit quote premia in units of the underlying
/// (a BTC option costs 0.05 BTC); models price in the quote currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PriceQuotation {
    /// Premium in quote currency (USD).
    #[default]
    QuoteCurrency,
    /// Premium in units of the underlying.
    Underlying,
}

/// One instrument observed at one timestamp.
///
/// # Examples
/// ```
/// use pricer_core::types::{MarketObservation, OptionContract, OptionType, PriceQuotation};
///
/// let obs = MarketObservation::new(
///     "BTC-29MAR24-52000-C",
///     "BTC",
///     OptionContract::new(52_000.0, 0.25, OptionType::Call),
///     50_000.0,
///     0.045,
/// )
/// .with_market_price(0.05)
/// .with_quotation(PriceQuotation::Underlying);
///
/// assert_eq!(obs.market_price_in_quote(), Some(2_500.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketObservation {
    /// Venue instrument identifier.
    pub instrument_id: String,
    /// Underlying symbol (BTC, ETH, ...).
    pub symbol: String,
    /// Contract terms.
    pub contract: OptionContract,
    /// Underlying spot in quote currency.
    pub spot: f64,
    /// Continuously compounded risk-free rate. May be negative.
    pub rate: f64,
    /// Observed premium, in the unit given by `quotation`.
    pub market_price: Option<f64>,
    /// Observed implied volatility (decimal, 0.8 = 80%).
    pub implied_volatility: Option<f64>,
    /// Unit of `market_price`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub quotation: PriceQuotation,
    /// Bid-ask spread in the same unit as `market_price`.
    pub bid_ask_spread: Option<f64>,
    /// Observation timestamp, required for absolute expiries.
    pub valuation_time: Option<DateTime<Utc>>,
}

impl MarketObservation {
    /// Observation with no quotes attached.
    pub fn new(
        instrument_id: impl Into<String>,
        symbol: impl Into<String>,
        contract: OptionContract,
        spot: f64,
        rate: f64,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            symbol: symbol.into(),
            contract,
            spot,
            rate,
            market_price: None,
            implied_volatility: None,
            quotation: PriceQuotation::QuoteCurrency,
            bid_ask_spread: None,
            valuation_time: None,
        }
    }

    /// Set the observed premium.
    pub fn with_market_price(mut self, price: f64) -> Self {
        self.market_price = Some(price);
        self
    }

    /// Set the observed implied volatility.
    pub fn with_implied_volatility(mut self, vol: f64) -> Self {
        self.implied_volatility = Some(vol);
        self
    }

    /// Set the premium unit.
    pub fn with_quotation(mut self, quotation: PriceQuotation) -> Self {
        self.quotation = quotation;
        self
    }

    /// Set the bid-ask spread.
    pub fn with_bid_ask_spread(mut self, spread: f64) -> Self {
        self.bid_ask_spread = Some(spread);
        self
    }

    /// Set the valuation timestamp.
    pub fn with_valuation_time(mut self, time: DateTime<Utc>) -> Self {
        self.valuation_time = Some(time);
        self
    }

    /// Time to expiry in years against this observation's valuation time.
    pub fn time_to_expiry(&self) -> Result<f64, PricingError> {
        self.contract.time_to_expiry(self.valuation_time)
    }

    /// Strike over spot.
    #[inline]
    pub fn moneyness(&self) -> f64 {
        self.contract.strike / self.spot
    }

    fn to_quote(&self, value: f64) -> f64 {
        match self.quotation {
            PriceQuotation::QuoteCurrency => value,
            PriceQuotation::Underlying => value * self.spot,
        }
    }

    /// Observed premium converted to quote currency.
    pub fn market_price_in_quote(&self) -> Option<f64> {
        self.market_price.map(|p| self.to_quote(p))
    }

    /// Bid-ask spread converted to quote currency.
    pub fn bid_ask_spread_in_quote(&self) -> Option<f64> {
        self.bid_ask_spread.map(|s| self.to_quote(s))
    }

    /// Validate contract, spot, rate and any quotes present.
    ///
    /// # Errors
    ///
    /// `InvalidInput` describing the first offending field.
    pub fn validate(&self) -> Result<(), PricingError> {
        self.contract.validate()?;
        self.validate_market()?;
        self.time_to_expiry()?;
        Ok(())
    }

    /// Validate spot, rate and any quotes present, ignoring the contract.
    ///
    /// # Errors
    ///
    /// `InvalidInput` describing the first offending field.
    pub fn validate_market(&self) -> Result<(), PricingError> {
        if !self.spot.is_finite() || self.spot <= 0.0 {
            return Err(PricingError::invalid_input(format!(
                "{}: spot must be positive, got {}",
                self.instrument_id, self.spot
            )));
        }
        if !self.rate.is_finite() {
            return Err(PricingError::invalid_input(format!(
                "{}: rate must be finite",
                self.instrument_id
            )));
        }
        check_non_negative(&self.instrument_id, "market price", self.market_price)?;
        check_non_negative(
            &self.instrument_id,
            "implied volatility",
            self.implied_volatility,
        )?;
        check_non_negative(&self.instrument_id, "bid-ask spread", self.bid_ask_spread)
    }
}

fn check_non_negative(id: &str, field: &str, value: Option<f64>) -> Result<(), PricingError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(PricingError::invalid_input(format!(
            "{}: {} must be non-negative, got {}",
            id, field, v
        ))),
        _ => Ok(()),
    }
}

/// Selects the observations worth fitting a model to.
///
/// Defaults drop contracts within two weeks of expiry, strikes outside
/// `(0.4, 2.5)` times spot and observations without a positive premium.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObservationFilter {
    /// Minimum time to expiry in years (exclusive).
    pub min_time_to_expiry: f64,
    /// Lower strike/spot bound (exclusive).
    pub min_moneyness: f64,
    /// Upper strike/spot bound (exclusive).
    pub max_moneyness: f64,
    /// Drop observations without a strictly positive premium.
    pub require_market_price: bool,
}

impl Default for ObservationFilter {
    fn default() -> Self {
        Self {
            min_time_to_expiry: 14.0 / 365.0,
            min_moneyness: 0.4,
            max_moneyness: 2.5,
            require_market_price: true,
        }
    }
}

impl ObservationFilter {
    /// Filter that keeps every valid observation.
    pub fn permissive() -> Self {
        Self {
            min_time_to_expiry: 0.0,
            min_moneyness: 0.0,
            max_moneyness: f64::INFINITY,
            require_market_price: false,
        }
    }

    /// Set the minimum time to expiry.
    pub fn with_min_time_to_expiry(mut self, years: f64) -> Self {
        self.min_time_to_expiry = years;
        self
    }

    /// Set the moneyness band.
    pub fn with_moneyness_band(mut self, min: f64, max: f64) -> Self {
        self.min_moneyness = min;
        self.max_moneyness = max;
        self
    }

    /// Whether an observation passes. Invalid observations never pass.
    pub fn accepts(&self, observation: &MarketObservation) -> bool {
        if observation.validate().is_err() {
            return false;
        }
        let t = match observation.time_to_expiry() {
            Ok(t) => t,
            Err(_) => return false,
        };
        let m = observation.moneyness();
        let priced = observation.market_price.map_or(false, |p| p > 0.0);

        t > self.min_time_to_expiry
            && m > self.min_moneyness
            && m < self.max_moneyness
            && (priced || !self.require_market_price)
    }

    /// Accepted observations, in input order.
    pub fn apply(&self, observations: &[MarketObservation]) -> Vec<MarketObservation> {
        observations
            .iter()
            .filter(|o| self.accepts(o))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionType;
    use chrono::{Duration, TimeZone};

    fn obs(strike: f64, t: f64) -> MarketObservation {
        MarketObservation::new(
            format!("BTC-{}-C", strike),
            "BTC",
            OptionContract::new(strike, t, OptionType::Call),
            50_000.0,
            0.045,
        )
        .with_market_price(0.04)
        .with_quotation(PriceQuotation::Underlying)
    }

    #[test]
    fn test_validate_market_ignores_contract() {
        let o = obs(-1.0, 0.25);
        assert!(o.validate().is_err());
        assert!(o.validate_market().is_ok());

        let bad_spot = MarketObservation { spot: 0.0, ..obs(52_000.0, 0.25) };
        assert!(bad_spot.validate_market().is_err());
    }

    #[test]
    fn test_market_price_conversion() {
        let o = obs(52_000.0, 0.25);
        assert!((o.market_price_in_quote().unwrap() - 2_000.0).abs() < 1e-9);

        let usd = o.clone().with_quotation(PriceQuotation::QuoteCurrency);
        assert_eq!(usd.market_price_in_quote(), Some(0.04));
    }

    #[test]
    fn test_validate_ok() {
        assert!(obs(52_000.0, 0.25).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_spot_and_quotes() {
        let mut o = obs(52_000.0, 0.25);
        o.spot = 0.0;
        assert!(matches!(o.validate(), Err(PricingError::InvalidInput(_))));

        let o = obs(52_000.0, 0.25).with_market_price(-1.0);
        assert!(o.validate().is_err());

        let o = obs(52_000.0, 0.25).with_implied_volatility(f64::NAN);
        assert!(o.validate().is_err());
    }

    #[test]
    fn test_negative_rate_allowed() {
        let mut o = obs(52_000.0, 0.25);
        o.rate = -0.005;
        assert!(o.validate().is_ok());
    }

    #[test]
    fn test_time_to_expiry_from_valuation_time() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        let o = MarketObservation::new(
            "BTC-X",
            "BTC",
            OptionContract::expiring_at(50_000.0, now + Duration::days(146), OptionType::Put),
            50_000.0,
            0.0,
        )
        .with_valuation_time(now);
        assert!((o.time_to_expiry().unwrap() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_filter_defaults() {
        let filter = ObservationFilter::default();
        assert!(filter.accepts(&obs(52_000.0, 0.25)));
        // one week to expiry
        assert!(!filter.accepts(&obs(52_000.0, 7.0 / 365.0)));
        // deep wings
        assert!(!filter.accepts(&obs(15_000.0, 0.25)));
        assert!(!filter.accepts(&obs(130_000.0, 0.25)));
        // zero premium
        assert!(!filter.accepts(&obs(52_000.0, 0.25).with_market_price(0.0)));
    }

    #[test]
    fn test_filter_apply_keeps_order() {
        let input = vec![
            obs(40_000.0, 0.5),
            obs(10_000.0, 0.5),
            obs(60_000.0, 0.5),
        ];
        let kept = ObservationFilter::default().apply(&input);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].contract.strike, 40_000.0);
        assert_eq!(kept[1].contract.strike, 60_000.0);
    }

    #[test]
    fn test_permissive_filter() {
        let filter = ObservationFilter::permissive();
        let mut o = obs(10_000.0, 1.0 / 365.0);
        o.market_price = None;
        assert!(filter.accepts(&o));
    }
}
