//! Model-versus-market comparison.
//!
//! Errors are signed `model - market`: a positive bias means the model
//! overprices. An instrument enters the summary only when the market price
//! and both model prices are finite.

use std::collections::HashMap;

use pricer_core::types::MarketObservation;
use pricer_pricing::PricingResult;
use tracing::debug;

use crate::error::ReportError;
use crate::statistics::{quantile, Describe};

/// Report configuration.
///
/// # Fields
///
/// * `outlier_quantile` - Drop instruments whose absolute Heston error is
///   above this quantile of all absolute Heston errors. `None` keeps all.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReportConfig {
    /// Heston error trimming quantile.
    pub outlier_quantile: Option<f64>,
}

impl ReportConfig {
    /// Trim Heston outliers at `q` (0.975 drops the worst 2.5%).
    pub fn with_outlier_quantile(mut self, q: f64) -> Self {
        self.outlier_quantile = Some(q);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ReportError> {
        match self.outlier_quantile {
            Some(q) if !(q > 0.0 && q <= 1.0) => Err(ReportError::InvalidConfig(format!(
                "outlier quantile must lie in (0, 1], got {}",
                q
            ))),
            _ => Ok(()),
        }
    }
}

/// Prices and errors for one instrument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstrumentComparison {
    /// Instrument identifier, when known.
    pub instrument_id: Option<String>,
    /// Strike, when known.
    pub strike: Option<f64>,
    /// Market price.
    pub market: f64,
    /// Black-Scholes price.
    pub black_scholes: f64,
    /// Heston price.
    pub heston: f64,
    /// black_scholes - market
    pub error_bs: f64,
    /// heston - market
    pub error_heston: f64,
    /// Whether the instrument enters the summary statistics.
    pub included: bool,
}

impl InstrumentComparison {
    fn new(instrument_id: Option<String>, strike: Option<f64>, market: f64, bs: f64, heston: f64) -> Self {
        let included = market.is_finite() && bs.is_finite() && heston.is_finite();
        Self {
            instrument_id,
            strike,
            market,
            black_scholes: bs,
            heston,
            error_bs: bs - market,
            error_heston: heston - market,
            included,
        }
    }
}

/// Summary of both models against the market.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonReport {
    /// Mean absolute Black-Scholes error.
    pub mae_bs: f64,
    /// Mean absolute Heston error.
    pub mae_heston: f64,
    /// Mean signed Black-Scholes error.
    pub bias_bs: f64,
    /// Mean signed Heston error.
    pub bias_heston: f64,
    /// Every instrument, in input order.
    pub per_instrument_errors: Vec<InstrumentComparison>,
    /// Instruments left out because a price was missing or flagged.
    pub excluded: usize,
    /// Instruments left out by outlier trimming.
    pub trimmed: usize,
    /// Absolute Black-Scholes error statistics.
    pub stats_bs: Describe,
    /// Absolute Heston error statistics.
    pub stats_heston: Describe,
}

impl ComparisonReport {
    /// Instruments entering the summary.
    pub fn included(&self) -> impl Iterator<Item = &InstrumentComparison> {
        self.per_instrument_errors.iter().filter(|e| e.included)
    }

    /// The `n` included instruments with the largest absolute Heston error,
    /// worst first.
    pub fn largest_heston_errors(&self, n: usize) -> Vec<&InstrumentComparison> {
        let mut rows: Vec<_> = self.included().collect();
        rows.sort_by(|a, b| b.error_heston.abs().total_cmp(&a.error_heston.abs()));
        rows.truncate(n);
        rows
    }

    /// Model with the lower MAE, `None` on a tie or an empty report.
    pub fn better_model(&self) -> Option<&'static str> {
        if self.mae_heston < self.mae_bs {
            Some("heston")
        } else if self.mae_bs < self.mae_heston {
            Some("black_scholes")
        } else {
            None
        }
    }
}

/// Summarise three aligned price series with the default configuration.
///
/// # Errors
///
/// `ReportError::LengthMismatch` when the series differ in length.
///
/// # Examples
/// ```
/// use pricer_report::summarize;
///
/// let market = [10.0, 5.0, f64::NAN];
/// let bs = [11.0, 4.0, 2.0];
/// let heston = [10.5, 5.5, 2.0];
///
/// let report = summarize(&market, &bs, &heston).unwrap();
/// assert_eq!(report.excluded, 1);
/// assert_eq!(report.mae_bs, 1.0);
/// assert_eq!(report.bias_bs, 0.0);
/// assert_eq!(report.mae_heston, 0.5);
/// ```
pub fn summarize(
    market: &[f64],
    black_scholes: &[f64],
    heston: &[f64],
) -> Result<ComparisonReport, ReportError> {
    summarize_with(market, black_scholes, heston, &ReportConfig::default())
}

/// Summarise three aligned price series.
///
/// # Errors
///
/// * `LengthMismatch` - the series differ in length
/// * `InvalidConfig` - outlier quantile outside (0, 1]
pub fn summarize_with(
    market: &[f64],
    black_scholes: &[f64],
    heston: &[f64],
    config: &ReportConfig,
) -> Result<ComparisonReport, ReportError> {
    if market.len() != black_scholes.len() || market.len() != heston.len() {
        return Err(ReportError::LengthMismatch {
            market: market.len(),
            black_scholes: black_scholes.len(),
            heston: heston.len(),
        });
    }
    let rows = market
        .iter()
        .zip(black_scholes)
        .zip(heston)
        .map(|((&m, &b), &h)| InstrumentComparison::new(None, None, m, b, h))
        .collect();
    build(rows, config)
}

/// Summarise pricing results against observations.
///
/// A result at the same position as its observation with the same instrument
/// id is used directly, so repeated observations of one instrument keep
/// their own prices. Otherwise the result is looked up by instrument id.
/// Market prices are taken in quote currency. Flagged results carry a NaN
/// price and are excluded.
///
/// # Errors
///
/// * `MissingResult` - an observation has no result for one of the models
/// * `InvalidConfig` - outlier quantile outside (0, 1]
pub fn summarize_results(
    observations: &[MarketObservation],
    black_scholes: &[PricingResult],
    heston: &[PricingResult],
    config: &ReportConfig,
) -> Result<ComparisonReport, ReportError> {
    let by_id = |results: &[PricingResult]| -> HashMap<String, f64> {
        results
            .iter()
            .map(|r| (r.instrument_id.clone(), r.price))
            .collect()
    };
    let bs = by_id(black_scholes);
    let hs = by_id(heston);

    let lookup = |results: &[PricingResult],
                  prices: &HashMap<String, f64>,
                  index: usize,
                  id: &str,
                  model: &str| {
        match results.get(index) {
            Some(r) if r.instrument_id == id => Ok(r.price),
            _ => prices
                .get(id)
                .copied()
                .ok_or_else(|| ReportError::MissingResult {
                    instrument_id: id.to_string(),
                    model: model.to_string(),
                }),
        }
    };

    let rows = observations
        .iter()
        .enumerate()
        .map(|(index, obs)| {
            let id = obs.instrument_id.as_str();
            Ok(InstrumentComparison::new(
                Some(obs.instrument_id.clone()),
                Some(obs.contract.strike),
                obs.market_price_in_quote().unwrap_or(f64::NAN),
                lookup(black_scholes, &bs, index, id, "black_scholes")?,
                lookup(heston, &hs, index, id, "heston")?,
            ))
        })
        .collect::<Result<Vec<_>, ReportError>>()?;
    build(rows, config)
}

fn build(
    mut rows: Vec<InstrumentComparison>,
    config: &ReportConfig,
) -> Result<ComparisonReport, ReportError> {
    config.validate()?;
    let excluded = rows.iter().filter(|r| !r.included).count();

    let mut trimmed = 0;
    if let Some(q) = config.outlier_quantile {
        let abs_heston: Vec<f64> = rows
            .iter()
            .filter(|r| r.included)
            .map(|r| r.error_heston.abs())
            .collect();
        let cutoff = quantile(&abs_heston, q);
        for row in rows.iter_mut().filter(|r| r.included) {
            if row.error_heston.abs() > cutoff {
                row.included = false;
                trimmed += 1;
            }
        }
    }

    let (abs_bs, abs_heston): (Vec<f64>, Vec<f64>) = rows
        .iter()
        .filter(|r| r.included)
        .map(|r| (r.error_bs.abs(), r.error_heston.abs()))
        .unzip();
    let n = abs_bs.len();
    let bias = |error: fn(&InstrumentComparison) -> f64| {
        if n == 0 {
            return f64::NAN;
        }
        rows.iter().filter(|r| r.included).map(error).sum::<f64>() / n as f64
    };
    let bias_bs = bias(|r| r.error_bs);
    let bias_heston = bias(|r| r.error_heston);

    let stats_bs = Describe::from_values(&abs_bs);
    let stats_heston = Describe::from_values(&abs_heston);

    debug!(
        instruments = rows.len(),
        included = n,
        excluded,
        trimmed,
        mae_bs = stats_bs.mean,
        mae_heston = stats_heston.mean,
        "comparison report built"
    );

    Ok(ComparisonReport {
        mae_bs: stats_bs.mean,
        mae_heston: stats_heston.mean,
        bias_bs,
        bias_heston,
        per_instrument_errors: rows,
        excluded,
        trimmed,
        stats_bs,
        stats_heston,
    })
}
