//! Option chain sources: venue quote CSVs and synthetic Heston chains.
//!
//! The CSV layout follows a Deribit export, one row per instrument:
//!
//! ```text
//! instrument_name,symbol,strike_price,option_type,expiration_date,spot_price,real_market_price,implied_volatility,bid_ask_spread
//! BTC-28MAR25-60000-C,BTC,60000,call,1743148800,52000,0.061,0.63,0.0015
//! ```
//!
//! `expiration_date` is Unix seconds. `real_market_price` and
//! `bid_ask_spread` are in units of the underlying; `implied_volatility` is
//! decimal. Empty cells are missing quotes.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use pricer_core::types::{MarketObservation, OptionContract, OptionType, PriceQuotation};
use pricer_models::analytical::black_scholes;
use pricer_pricing::HestonPricer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SyntheticConfig;
use crate::error::DemoError;

/// One CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Venue instrument identifier.
    pub instrument_name: String,
    /// Underlying symbol.
    pub symbol: String,
    /// Strike in quote currency.
    pub strike_price: f64,
    /// `call`/`put` or `C`/`P`.
    pub option_type: String,
    /// Expiry as Unix seconds.
    pub expiration_date: i64,
    /// Underlying spot in quote currency.
    pub spot_price: f64,
    /// Premium in units of the underlying.
    pub real_market_price: Option<f64>,
    /// Decimal implied volatility.
    pub implied_volatility: Option<f64>,
    /// Bid-ask spread in units of the underlying.
    pub bid_ask_spread: Option<f64>,
}

impl QuoteRecord {
    /// Convert to an observation valued at `valuation_time`.
    pub fn into_observation(
        self,
        valuation_time: DateTime<Utc>,
        rate: f64,
    ) -> Result<MarketObservation, DemoError> {
        let option_type: OptionType = self.option_type.parse()?;
        let expiry = DateTime::<Utc>::from_timestamp(self.expiration_date, 0).ok_or_else(|| {
            DemoError::data_load(format!(
                "{}: expiration_date {} out of range",
                self.instrument_name, self.expiration_date
            ))
        })?;

        let mut obs = MarketObservation::new(
            self.instrument_name,
            self.symbol,
            OptionContract::expiring_at(self.strike_price, expiry, option_type),
            self.spot_price,
            rate,
        )
        .with_quotation(PriceQuotation::Underlying)
        .with_valuation_time(valuation_time);
        obs.market_price = self.real_market_price;
        obs.implied_volatility = self.implied_volatility;
        obs.bid_ask_spread = self.bid_ask_spread;
        Ok(obs)
    }
}

/// Read quotes from any CSV source.
///
/// Rows that cannot be converted are skipped with a warning; a malformed
/// CSV is an error.
pub fn read_quotes<R: Read>(
    reader: R,
    valuation_time: DateTime<Utc>,
    rate: f64,
) -> Result<Vec<MarketObservation>, DemoError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut observations = Vec::new();
    for (row, record) in csv_reader.deserialize::<QuoteRecord>().enumerate() {
        let record = record?;
        let name = record.instrument_name.clone();
        match record.into_observation(valuation_time, rate) {
            Ok(obs) => observations.push(obs),
            Err(e) => warn!(row = row + 1, instrument = %name, error = %e, "skipping quote"),
        }
    }
    debug!(count = observations.len(), "quotes loaded");
    Ok(observations)
}

/// Read quotes from a CSV file.
pub fn load_quotes(
    path: &Path,
    valuation_time: DateTime<Utc>,
    rate: f64,
) -> Result<Vec<MarketObservation>, DemoError> {
    let file = File::open(path)
        .map_err(|e| DemoError::data_load(format!("{}: {}", path.display(), e)))?;
    read_quotes(file, valuation_time, rate)
}

/// Generate a noisy Heston option chain.
///
/// Strikes below spot quote puts, the rest calls. Each quote carries the
/// implied volatility of its noisy premium and a bid-ask spread of 5% of
/// the premium, at least 0.0005 units of the underlying. Quotes whose
/// premium cannot be inverted carry no implied volatility.
pub fn synthesize(
    config: &SyntheticConfig,
    rate: f64,
    pricer: &HestonPricer,
) -> Result<Vec<MarketObservation>, DemoError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let spot = config.spot;
    let mut observations = Vec::with_capacity(config.moneyness.len() * config.maturities_days.len());

    for &days in &config.maturities_days {
        let t = f64::from(days) / 365.0;
        for &m in &config.moneyness {
            let strike = (spot * m).round();
            let option_type = if m < 1.0 { OptionType::Put } else { OptionType::Call };
            let (clean, _) = pricer.price_european(spot, strike, rate, t, option_type, &config.params)?;
            let z: f64 = rng.sample(StandardNormal);
            let premium = clean * (config.noise * z).exp();

            let code = if option_type.is_call() { "C" } else { "P" };
            let mut obs = MarketObservation::new(
                format!("{}-{}D-{}-{}", config.symbol, days, strike, code),
                config.symbol.as_str(),
                OptionContract::new(strike, t, option_type),
                spot,
                rate,
            )
            .with_quotation(PriceQuotation::Underlying)
            .with_market_price(premium / spot)
            .with_bid_ask_spread((0.05 * premium / spot).max(0.0005));
            obs.implied_volatility =
                black_scholes::implied_volatility(premium, spot, strike, rate, t, option_type).ok();
            observations.push(obs);
        }
    }
    debug!(count = observations.len(), seed = config.seed, "synthetic chain generated");
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    const CSV: &str = "\
instrument_name,symbol,strike_price,option_type,expiration_date,spot_price,real_market_price,implied_volatility,bid_ask_spread
BTC-A-60000-C,BTC,60000,call,1735689600,50000,0.05,0.7,0.001
BTC-A-40000-P,BTC,40000,P,1735689600,50000,,0.75,
BTC-A-50000-X,BTC,50000,straddle,1735689600,50000,0.1,0.7,0.001
";

    fn valuation() -> DateTime<Utc> {
        // 2024-10-02, 91 days before 2025-01-01
        Utc.with_ymd_and_hms(2024, 10, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_read_quotes() {
        let observations = read_quotes(CSV.as_bytes(), valuation(), 0.01).unwrap();
        assert_eq!(observations.len(), 2);

        let call = &observations[0];
        assert_eq!(call.instrument_id, "BTC-A-60000-C");
        assert_eq!(call.contract.option_type, OptionType::Call);
        assert_eq!(call.market_price_in_quote(), Some(2_500.0));
        assert_eq!(call.bid_ask_spread_in_quote(), Some(50.0));
        assert_relative_eq!(call.time_to_expiry().unwrap(), 91.0 / 365.0, epsilon = 1e-12);

        let put = &observations[1];
        assert_eq!(put.contract.option_type, OptionType::Put);
        assert_eq!(put.market_price, None);
        assert_eq!(put.bid_ask_spread, None);
        assert_eq!(put.implied_volatility, Some(0.75));
    }

    #[test]
    fn test_malformed_csv_is_an_error() {
        let bad = "instrument_name,symbol\nBTC-1,BTC\n";
        assert!(matches!(
            read_quotes(bad.as_bytes(), valuation(), 0.0),
            Err(DemoError::Csv(_))
        ));
    }

    #[test]
    fn test_synthesize_is_seeded() {
        let config = SyntheticConfig {
            moneyness: vec![0.8, 1.0, 1.2],
            maturities_days: vec![60, 180],
            ..Default::default()
        };
        let pricer = HestonPricer::default();
        let a = synthesize(&config, 0.0, &pricer).unwrap();
        let b = synthesize(&config, 0.0, &pricer).unwrap();

        assert_eq!(a.len(), 6);
        assert_eq!(a, b);
        assert_eq!(a[0].contract.option_type, OptionType::Put);
        assert_eq!(a[0].instrument_id, "BTC-60D-40000-P");
        assert!(a.iter().all(|o| o.validate().is_ok()));
        assert!(a.iter().all(|o| o.implied_volatility.is_some()));
    }

    #[test]
    fn test_synthesize_without_noise_matches_model() {
        let config = SyntheticConfig {
            moneyness: vec![1.0],
            maturities_days: vec![91],
            noise: 0.0,
            ..Default::default()
        };
        let pricer = HestonPricer::default();
        let chain = synthesize(&config, 0.02, &pricer).unwrap();
        let (model, _) = pricer
            .price_european(50_000.0, 50_000.0, 0.02, 91.0 / 365.0, OptionType::Call, &config.params)
            .unwrap();
        assert_relative_eq!(chain[0].market_price_in_quote().unwrap(), model, epsilon = 1e-6);
    }
}
