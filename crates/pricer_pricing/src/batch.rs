//! Batch pricing over observation slices.
//!
//! Every observation produces exactly one [`PricingResult`], in input order.
//! Failures are flagged per instrument and never abort the batch.

use pricer_core::types::MarketObservation;
use pricer_models::models::HestonParams;
use tracing::{debug, warn};

use crate::black_scholes::BlackScholesPricer;
use crate::heston::HestonPricer;
use crate::parallel::ParallelConfig;
use crate::result::{ModelTag, PricingResult};

/// A model that prices single observations.
pub trait ObservationPricer: Sync {
    /// Producing model.
    fn model(&self) -> ModelTag;

    /// Price one observation.
    fn price_one(&self, observation: &MarketObservation) -> PricingResult;
}

/// Black-Scholes with a batch-level volatility fallback bound in.
#[derive(Debug, Clone, Copy)]
pub struct BoundBlackScholes {
    pricer: BlackScholesPricer,
    fallback: Option<f64>,
}

impl BoundBlackScholes {
    /// Bind `pricer` to a fallback volatility.
    pub fn new(pricer: BlackScholesPricer, fallback: Option<f64>) -> Self {
        Self { pricer, fallback }
    }
}

impl ObservationPricer for BoundBlackScholes {
    fn model(&self) -> ModelTag {
        ModelTag::BlackScholes
    }

    fn price_one(&self, observation: &MarketObservation) -> PricingResult {
        self.pricer.price(observation, self.fallback)
    }
}

/// Heston pricer bound to one parameter set.
#[derive(Debug, Clone)]
pub struct BoundHeston<'a> {
    pricer: &'a HestonPricer,
    params: HestonParams,
}

impl<'a> BoundHeston<'a> {
    /// Bind `pricer` to `params`.
    pub fn new(pricer: &'a HestonPricer, params: HestonParams) -> Self {
        Self { pricer, params }
    }
}

impl ObservationPricer for BoundHeston<'_> {
    fn model(&self) -> ModelTag {
        ModelTag::Heston
    }

    fn price_one(&self, observation: &MarketObservation) -> PricingResult {
        self.pricer.price_observation(observation, &self.params)
    }
}

/// Price a batch with any observation pricer.
pub fn price_batch<P: ObservationPricer>(
    pricer: &P,
    observations: &[MarketObservation],
    parallel: &ParallelConfig,
) -> Vec<PricingResult> {
    let results = parallel.map(observations, |obs| pricer.price_one(obs));
    let flagged = results.iter().filter(|r| !r.is_ok()).count();
    debug!(
        model = %pricer.model(),
        total = results.len(),
        flagged,
        "batch priced"
    );
    results
}

/// Price a batch under Black-Scholes.
///
/// With [`VolatilitySource::Implied`](crate::VolatilitySource::Implied),
/// observations lacking an implied volatility use the median of the
/// batch's implied volatilities.
pub fn price_batch_black_scholes(
    pricer: &BlackScholesPricer,
    observations: &[MarketObservation],
    parallel: &ParallelConfig,
) -> Vec<PricingResult> {
    let fallback = median_implied_volatility(observations);
    price_batch(&BoundBlackScholes::new(*pricer, fallback), observations, parallel)
}

/// Price a batch under Heston with one parameter set.
///
/// A Feller violation is logged once for the whole batch.
pub fn price_batch_heston(
    pricer: &HestonPricer,
    observations: &[MarketObservation],
    params: &HestonParams,
    parallel: &ParallelConfig,
) -> Vec<PricingResult> {
    if let Some(feller_ratio) = pricer.feller_violation(params) {
        warn!(
            feller_ratio,
            instruments = observations.len(),
            "Heston parameters violate the Feller condition"
        );
    }
    price_batch(&BoundHeston::new(pricer, *params), observations, parallel)
}

/// Median of the finite, non-negative implied volatilities in the batch.
///
/// Returns `None` when no observation carries one.
pub fn median_implied_volatility(observations: &[MarketObservation]) -> Option<f64> {
    let mut vols: Vec<f64> = observations
        .iter()
        .filter_map(|o| o.implied_volatility)
        .filter(|v| v.is_finite() && *v >= 0.0)
        .collect();
    if vols.is_empty() {
        return None;
    }
    vols.sort_by(f64::total_cmp);
    let mid = vols.len() / 2;
    Some(if vols.len() % 2 == 0 {
        0.5 * (vols[mid - 1] + vols[mid])
    } else {
        vols[mid]
    })
}
