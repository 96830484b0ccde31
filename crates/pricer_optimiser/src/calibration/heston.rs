//! Heston model calibration.
//!
//! ## Calibration Approach
//!
//! The five Heston parameters are fitted to observed premia by minimising
//!
//! ```text
//! Σ wᵢ · (modelᵢ - marketᵢ)²     (squared metric)
//! Σ wᵢ · |modelᵢ - marketᵢ|      (absolute metric)
//! ```
//!
//! in the unconstrained coordinates of [`super::transform`]. The search runs
//! once from the initial guess and `max_restarts` more times from seeded
//! perturbations of it; the lowest objective wins.
//!
//! ## Failure Handling
//!
//! Instruments that cannot be priced at the initial guess are dropped from the
//! fit. Instruments that fail later in the search contribute a large finite
//! penalty so the optimiser backs away from that region.

use std::time::Instant;

use pricer_core::math::solvers::{
    LMConfig, LevenbergMarquardtSolver, NelderMeadConfig, NelderMeadSolver,
};
use pricer_core::types::{MarketObservation, SolverError};
use pricer_models::models::HestonParams;
use pricer_pricing::{HestonPricer, HestonPricerConfig, ParallelConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, info, warn};

use super::result::{CalibrationDiagnostics, CalibrationResult, InstrumentResidual};
use super::transform::{to_constrained, to_unconstrained};
use super::weights::{ErrorMetric, WeightingScheme};
use crate::error::CalibrationError;

/// Penalty multiplier for instruments that fail to price mid-search.
pub const PENALTY_SCALE: f64 = 10.0;

/// Optimisation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Optimiser {
    /// Levenberg-Marquardt on the residual vector. Squared metric only.
    #[default]
    LevenbergMarquardt,
    /// Derivative-free Nelder-Mead simplex on the scalar objective.
    NelderMead,
}

/// Heston calibrator configuration.
///
/// # Examples
///
/// ```
/// use pricer_optimiser::calibration::{ErrorMetric, HestonCalibratorConfig, Optimiser};
///
/// let config = HestonCalibratorConfig::default()
///     .with_optimiser(Optimiser::NelderMead)
///     .with_metric(ErrorMetric::Absolute)
///     .with_max_restarts(4)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HestonCalibratorConfig {
    /// Optimisation algorithm.
    pub optimiser: Optimiser,
    /// Levenberg-Marquardt settings.
    pub lm: LMConfig,
    /// Nelder-Mead settings.
    pub nelder_mead: NelderMeadConfig,
    /// Pricer used inside the objective.
    pub pricer: HestonPricerConfig,
    /// Instrument weighting.
    pub weighting: WeightingScheme,
    /// Per-instrument loss.
    pub metric: ErrorMetric,
    /// Additional runs from perturbed starting points.
    pub max_restarts: usize,
    /// Standard deviation of restart perturbations in unconstrained space.
    pub perturbation: f64,
    /// Restart RNG seed.
    pub seed: u64,
    /// Parallel pricing and restarts.
    pub parallel: ParallelConfig,
}

impl Default for HestonCalibratorConfig {
    fn default() -> Self {
        Self {
            optimiser: Optimiser::default(),
            lm: LMConfig::default(),
            nelder_mead: NelderMeadConfig::default(),
            pricer: HestonPricerConfig::default().with_feller_warning(false),
            weighting: WeightingScheme::default(),
            metric: ErrorMetric::default(),
            max_restarts: 3,
            perturbation: 0.3,
            seed: 42,
            parallel: ParallelConfig::default(),
        }
    }
}

impl HestonCalibratorConfig {
    /// Set the optimisation algorithm.
    pub fn with_optimiser(mut self, optimiser: Optimiser) -> Self {
        self.optimiser = optimiser;
        self
    }

    /// Set the Levenberg-Marquardt settings.
    pub fn with_lm(mut self, lm: LMConfig) -> Self {
        self.lm = lm;
        self
    }

    /// Set the Nelder-Mead settings.
    pub fn with_nelder_mead(mut self, nelder_mead: NelderMeadConfig) -> Self {
        self.nelder_mead = nelder_mead;
        self
    }

    /// Set the pricer configuration.
    pub fn with_pricer(mut self, pricer: HestonPricerConfig) -> Self {
        self.pricer = pricer;
        self
    }

    /// Set the weighting scheme.
    pub fn with_weighting(mut self, weighting: WeightingScheme) -> Self {
        self.weighting = weighting;
        self
    }

    /// Set the error metric.
    pub fn with_metric(mut self, metric: ErrorMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the number of restarts.
    pub fn with_max_restarts(mut self, max_restarts: usize) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Set the restart perturbation scale.
    pub fn with_perturbation(mut self, perturbation: f64) -> Self {
        self.perturbation = perturbation;
        self
    }

    /// Set the restart seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the parallel execution settings.
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// `CalibrationError::InvalidConfig` for Levenberg-Marquardt with the
    /// absolute metric, a bad perturbation scale or bad solver and pricer
    /// settings.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.optimiser == Optimiser::LevenbergMarquardt && self.metric == ErrorMetric::Absolute {
            return Err(CalibrationError::invalid_config(
                "Levenberg-Marquardt requires the squared error metric",
            ));
        }
        if !self.perturbation.is_finite() || self.perturbation < 0.0 {
            return Err(CalibrationError::invalid_config(format!(
                "perturbation must be non-negative, got {}",
                self.perturbation
            )));
        }
        self.lm
            .validate()
            .and_then(|_| self.nelder_mead.validate())
            .map_err(|e| CalibrationError::invalid_config(e.to_string()))?;
        self.pricer
            .validate()
            .map_err(|e| CalibrationError::invalid_config(e.to_string()))
    }
}

/// One instrument in the fit.
#[derive(Debug, Clone)]
struct Target<'a> {
    observation: &'a MarketObservation,
    market: f64,
    weight: f64,
}

impl Target<'_> {
    /// Residual entry whose square is the loss.
    fn residual(&self, model: Option<f64>, metric: ErrorMetric) -> f64 {
        match model {
            Some(price) => match metric {
                ErrorMetric::Squared => self.weight.sqrt() * (price - self.market),
                ErrorMetric::Absolute => metric.loss(self.weight, price - self.market).sqrt(),
            },
            None => self.penalty(metric).sqrt(),
        }
    }

    fn loss(&self, model: Option<f64>, metric: ErrorMetric) -> f64 {
        match model {
            Some(price) => metric.loss(self.weight, price - self.market),
            None => self.penalty(metric),
        }
    }

    fn penalty(&self, metric: ErrorMetric) -> f64 {
        let scale = self.weight.sqrt() * (self.market.abs() + 1.0) * PENALTY_SCALE;
        match metric {
            ErrorMetric::Squared => scale * scale,
            ErrorMetric::Absolute => self.weight * (self.market.abs() + 1.0) * PENALTY_SCALE,
        }
    }
}

/// Outcome of one optimiser run.
#[derive(Debug, Clone)]
struct Run {
    z: Vec<f64>,
    objective: f64,
    iterations: usize,
    evaluations: usize,
    converged: bool,
}

/// Heston model calibrator.
///
/// # Examples
///
/// ```no_run
/// use pricer_core::types::{MarketObservation, OptionContract, OptionType};
/// use pricer_models::models::HestonParams;
/// use pricer_optimiser::calibration::HestonCalibrator;
///
/// let observations: Vec<MarketObservation> = vec![/* market quotes */];
/// let calibrator = HestonCalibrator::default();
/// let result = calibrator.calibrate(&observations, HestonParams::default())?;
/// println!("fitted {:?}, objective {}", result.params, result.objective);
/// # Ok::<(), pricer_optimiser::CalibrationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HestonCalibrator {
    config: HestonCalibratorConfig,
    pricer: HestonPricer,
}

impl Default for HestonCalibrator {
    fn default() -> Self {
        Self::new(HestonCalibratorConfig::default())
    }
}

impl HestonCalibrator {
    /// Create a calibrator with the given configuration.
    pub fn new(config: HestonCalibratorConfig) -> Self {
        Self {
            pricer: HestonPricer::new(config.pricer),
            config,
        }
    }

    /// Get the calibrator configuration.
    pub fn config(&self) -> &HestonCalibratorConfig {
        &self.config
    }

    /// Fit Heston parameters to the market prices of `observations`.
    ///
    /// # Errors
    ///
    /// * `EmptyObservations` - nothing to fit
    /// * `InvalidObservation` - an observation failed validation
    /// * `MissingMarketPrice` - an observation has no premium
    /// * `InvalidInitialGuess` - the guess is outside the parameter domain
    /// * `NoUsableInstruments` - nothing prices at the initial guess
    /// * `InvalidConfig` - inconsistent configuration
    /// * `Solver` - every optimiser run failed
    pub fn calibrate(
        &self,
        observations: &[MarketObservation],
        initial_guess: HestonParams,
    ) -> Result<CalibrationResult, CalibrationError> {
        let started = Instant::now();
        self.config.validate()?;
        if observations.is_empty() {
            return Err(CalibrationError::EmptyObservations);
        }
        initial_guess
            .validate()
            .map_err(CalibrationError::InvalidInitialGuess)?;

        let (targets, dropped) = self.build_targets(observations, &initial_guess)?;
        let z0 = to_unconstrained(&initial_guess).to_vec();
        let starts = self.starting_points(&z0)?;

        let runs = self.run_all(&targets, &starts);
        let evaluations: usize = runs
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|r| r.evaluations)
            .sum();

        let mut best: Option<(usize, Run)> = None;
        let mut last_error = None;
        for (index, run) in runs.into_iter().enumerate() {
            match run {
                Ok(run) => {
                    debug!(
                        run = index,
                        objective = run.objective,
                        iterations = run.iterations,
                        converged = run.converged,
                        "calibration run finished"
                    );
                    let better = best
                        .as_ref()
                        .map_or(true, |(_, b)| run.objective < b.objective);
                    if better {
                        best = Some((index, run));
                    }
                }
                Err(err) => {
                    warn!(run = index, error = %err, "calibration run failed");
                    last_error = Some(err);
                }
            }
        }
        let (winning_run, best) = match (best, last_error) {
            (Some(best), _) => best,
            (None, Some(err)) => return Err(err.into()),
            (None, None) => {
                return Err(CalibrationError::invalid_config("no calibration runs executed"))
            }
        };

        let params = to_constrained(&best.z);
        let residuals = self.fitted_residuals(observations, &targets, &params);
        let feller_satisfied = params.satisfies_feller();
        if !feller_satisfied {
            warn!(
                feller_ratio = params.feller_ratio(),
                "calibrated parameters violate the Feller condition"
            );
        }

        let diagnostics = CalibrationDiagnostics {
            iterations: best.iterations,
            evaluations,
            restarts_used: starts.len() - 1,
            winning_run,
            duration: started.elapsed(),
            ..CalibrationDiagnostics::default()
        }
        .with_residuals(&residuals);

        info!(
            v0 = params.v0,
            theta = params.theta,
            kappa = params.kappa,
            sigma = params.sigma,
            rho = params.rho,
            objective = best.objective,
            converged = best.converged,
            instruments = targets.len(),
            dropped = dropped.len(),
            "Heston calibration complete"
        );

        Ok(CalibrationResult {
            params,
            objective: best.objective,
            converged: best.converged,
            feller_satisfied,
            residuals,
            dropped,
            diagnostics,
        })
    }

    /// Objective value at `params` over `observations`.
    ///
    /// Uses the same weighting, metric and penalty as [`calibrate`](Self::calibrate),
    /// without dropping instruments.
    ///
    /// # Errors
    ///
    /// Same input errors as [`calibrate`](Self::calibrate).
    pub fn objective(
        &self,
        observations: &[MarketObservation],
        params: &HestonParams,
    ) -> Result<f64, CalibrationError> {
        if observations.is_empty() {
            return Err(CalibrationError::EmptyObservations);
        }
        let targets = observations
            .iter()
            .map(|obs| self.target(obs, params))
            .collect::<Result<Vec<_>, _>>()?;
        let models = self.model_prices(&targets, params);
        Ok(targets
            .iter()
            .zip(&models)
            .map(|(t, m)| t.loss(*m, self.config.metric))
            .sum())
    }

    fn target<'a>(
        &self,
        observation: &'a MarketObservation,
        guess: &HestonParams,
    ) -> Result<Target<'a>, CalibrationError> {
        observation
            .validate()
            .map_err(|source| CalibrationError::InvalidObservation {
                instrument_id: observation.instrument_id.clone(),
                source,
            })?;
        let market = observation.market_price_in_quote().ok_or_else(|| {
            CalibrationError::MissingMarketPrice {
                instrument_id: observation.instrument_id.clone(),
            }
        })?;
        let time_to_expiry =
            observation
                .time_to_expiry()
                .map_err(|source| CalibrationError::InvalidObservation {
                    instrument_id: observation.instrument_id.clone(),
                    source,
                })?;
        let weight = self.config.weighting.weight(
            observation,
            market,
            time_to_expiry,
            guess.v0.max(0.0).sqrt(),
        );
        Ok(Target {
            observation,
            market,
            weight,
        })
    }

    /// Validate observations and drop those that fail at the initial guess.
    fn build_targets<'a>(
        &self,
        observations: &'a [MarketObservation],
        guess: &HestonParams,
    ) -> Result<(Vec<Target<'a>>, Vec<String>), CalibrationError> {
        let candidates = observations
            .iter()
            .map(|obs| self.target(obs, guess))
            .collect::<Result<Vec<_>, _>>()?;

        let initial = self.model_prices(&candidates, guess);
        let mut targets = Vec::with_capacity(candidates.len());
        let mut dropped = Vec::new();
        for (target, model) in candidates.into_iter().zip(initial) {
            if model.is_some() {
                targets.push(target);
            } else {
                warn!(
                    instrument = %target.observation.instrument_id,
                    "instrument fails to price at the initial guess, dropped from fit"
                );
                dropped.push(target.observation.instrument_id.clone());
            }
        }

        if targets.is_empty() {
            return Err(CalibrationError::NoUsableInstruments {
                failed: dropped.len(),
            });
        }
        Ok((targets, dropped))
    }

    /// The initial point followed by `max_restarts` seeded perturbations.
    fn starting_points(&self, z0: &[f64]) -> Result<Vec<Vec<f64>>, CalibrationError> {
        let noise = Normal::new(0.0, self.config.perturbation)
            .map_err(|e| CalibrationError::invalid_config(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut starts = Vec::with_capacity(self.config.max_restarts + 1);
        starts.push(z0.to_vec());
        for _ in 0..self.config.max_restarts {
            starts.push(z0.iter().map(|z| z + noise.sample(&mut rng)).collect());
        }
        Ok(starts)
    }

    #[cfg(feature = "parallel")]
    fn run_all(&self, targets: &[Target<'_>], starts: &[Vec<f64>]) -> Vec<Result<Run, SolverError>> {
        use rayon::prelude::*;

        if self.config.parallel.enabled && starts.len() > 1 {
            starts.par_iter().map(|z| self.run(targets, z)).collect()
        } else {
            starts.iter().map(|z| self.run(targets, z)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run_all(&self, targets: &[Target<'_>], starts: &[Vec<f64>]) -> Vec<Result<Run, SolverError>> {
        starts.iter().map(|z| self.run(targets, z)).collect()
    }

    fn run(&self, targets: &[Target<'_>], z0: &[f64]) -> Result<Run, SolverError> {
        let metric = self.config.metric;
        match self.config.optimiser {
            Optimiser::LevenbergMarquardt => {
                let solver = LevenbergMarquardtSolver::new(self.config.lm);
                let residuals = |z: &[f64]| {
                    let params = to_constrained(z);
                    let models = self.model_prices(targets, &params);
                    targets
                        .iter()
                        .zip(&models)
                        .map(|(t, m)| t.residual(*m, metric))
                        .collect::<Vec<f64>>()
                };
                let result = solver.solve(residuals, z0.to_vec())?;
                Ok(Run {
                    z: result.params,
                    objective: result.residual_ss,
                    iterations: result.iterations,
                    evaluations: result.evaluations,
                    converged: result.converged,
                })
            }
            Optimiser::NelderMead => {
                let solver = NelderMeadSolver::new(self.config.nelder_mead);
                let objective = |z: &[f64]| {
                    let params = to_constrained(z);
                    let models = self.model_prices(targets, &params);
                    targets
                        .iter()
                        .zip(&models)
                        .map(|(t, m)| t.loss(*m, metric))
                        .sum::<f64>()
                };
                let result = solver.minimize(objective, z0.to_vec())?;
                Ok(Run {
                    z: result.params,
                    objective: result.fval,
                    iterations: result.iterations,
                    evaluations: result.evaluations,
                    converged: result.converged,
                })
            }
        }
    }

    /// Model prices in quote currency, `None` where pricing failed.
    fn model_prices(&self, targets: &[Target<'_>], params: &HestonParams) -> Vec<Option<f64>> {
        self.config.parallel.map(targets, |t| {
            self.pricer
                .price_observation(t.observation, params)
                .value()
                .filter(|p| p.is_finite())
        })
    }

    /// Residuals for every observation at the fitted parameters.
    fn fitted_residuals(
        &self,
        observations: &[MarketObservation],
        targets: &[Target<'_>],
        params: &HestonParams,
    ) -> Vec<InstrumentResidual> {
        // targets are an ordered subsequence of observations
        let mut remaining = targets.iter().peekable();
        let rows: Vec<(&MarketObservation, bool)> = observations
            .iter()
            .map(|obs| {
                let used = remaining
                    .next_if(|t| std::ptr::eq(t.observation, obs))
                    .is_some();
                (obs, used)
            })
            .collect();

        self.config.parallel.map(&rows, |&(obs, used_in_fit)| {
            let market = obs.market_price_in_quote().unwrap_or(f64::NAN);
            let model = self.pricer.price_observation(obs, params).price;
            InstrumentResidual {
                instrument_id: obs.instrument_id.clone(),
                market_price: market,
                model_price: model,
                residual: model - market,
                used_in_fit,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_core::types::{OptionContract, OptionType};

    fn quote(strike: f64, t: f64, price: Option<f64>) -> MarketObservation {
        let obs = MarketObservation::new(
            format!("SYN-{}-{}", strike, t),
            "SYN",
            OptionContract::new(strike, t, OptionType::Call),
            100.0,
            0.02,
        );
        match price {
            Some(p) => obs.with_market_price(p),
            None => obs,
        }
    }

    #[test]
    fn test_empty_observations() {
        let err = HestonCalibrator::default()
            .calibrate(&[], HestonParams::default())
            .unwrap_err();
        assert_eq!(err, CalibrationError::EmptyObservations);
    }

    #[test]
    fn test_missing_market_price() {
        let err = HestonCalibrator::default()
            .calibrate(&[quote(100.0, 1.0, None)], HestonParams::default())
            .unwrap_err();
        assert!(matches!(err, CalibrationError::MissingMarketPrice { .. }));
    }

    #[test]
    fn test_invalid_observation() {
        let err = HestonCalibrator::default()
            .calibrate(&[quote(-100.0, 1.0, Some(5.0))], HestonParams::default())
            .unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidObservation { .. }));
    }

    #[test]
    fn test_invalid_initial_guess() {
        let bad = HestonParams::from_array([0.04, 0.04, -2.0, 0.3, -0.5]);
        let err = HestonCalibrator::default()
            .calibrate(&[quote(100.0, 1.0, Some(10.0))], bad)
            .unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidInitialGuess(_)));
    }

    #[test]
    fn test_lm_with_absolute_metric_rejected() {
        let config = HestonCalibratorConfig::default().with_metric(ErrorMetric::Absolute);
        let err = HestonCalibrator::new(config)
            .calibrate(&[quote(100.0, 1.0, Some(10.0))], HestonParams::default())
            .unwrap_err();
        assert!(matches!(err, CalibrationError::InvalidConfig(_)));
    }

    #[test]
    fn test_all_instruments_failing_is_an_error() {
        use pricer_core::math::quadrature::QuadratureConfig;

        let starved = HestonPricerConfig::default().with_quadrature(
            QuadratureConfig::default()
                .with_abs_tolerance(1e-16)
                .with_rel_tolerance(1e-16)
                .with_max_subdivisions(1),
        );
        let config = HestonCalibratorConfig::default().with_pricer(starved);
        let err = HestonCalibrator::new(config)
            .calibrate(
                &[quote(100.0, 1.0, Some(10.0)), quote(110.0, 1.0, Some(6.0))],
                HestonParams::new(0.09, 0.09, 1.0, 1.5, -0.7).unwrap(),
            )
            .unwrap_err();
        assert_eq!(err, CalibrationError::NoUsableInstruments { failed: 2 });
    }

    #[test]
    fn test_penalty_is_finite_and_large() {
        let obs = quote(100.0, 1.0, Some(10.0));
        let target = Target {
            observation: &obs,
            market: 10.0,
            weight: 1.0,
        };
        let penalty = target.residual(None, ErrorMetric::Squared);
        assert_eq!(penalty, 110.0);
        assert!(target.residual(Some(10.5), ErrorMetric::Squared) < penalty);
        assert_eq!(target.loss(None, ErrorMetric::Absolute), 110.0);
    }

    /// Call whose forward S·e^(rT) overflows, so it never prices.
    fn unpriceable(strike: f64) -> MarketObservation {
        MarketObservation::new(
            format!("OVF-{}", strike),
            "SYN",
            OptionContract::new(strike, 2.0, OptionType::Call),
            100.0,
            400.0,
        )
        .with_market_price(1.0)
    }

    #[test]
    fn test_search_penalises_unpriceable_target() {
        let good = quote(100.0, 1.0, Some(10.0));
        let bad = unpriceable(100.0);
        let targets = vec![
            Target {
                observation: &good,
                market: 10.0,
                weight: 1.0,
            },
            Target {
                observation: &bad,
                market: 1.0,
                weight: 1.0,
            },
        ];
        let calibrator = HestonCalibrator::new(HestonCalibratorConfig::default().with_max_restarts(0));
        let z0 = to_unconstrained(&HestonParams::default()).to_vec();

        let models = calibrator.model_prices(&targets, &HestonParams::default());
        assert!(models[0].is_some());
        assert!(models[1].is_none());

        let start = calibrator
            .objective(&[good.clone(), bad.clone()], &HestonParams::default())
            .unwrap();

        // the penalty keeps every residual finite, so the solver runs
        let run = calibrator.run(&targets, &z0).unwrap();
        assert!(run.objective.is_finite());
        assert!(run.objective >= 400.0);
        assert!(run.objective <= start);
    }

    #[test]
    fn test_objective_includes_penalty() {
        let truth = HestonParams::new(0.04, 0.04, 2.0, 0.3, -0.5).unwrap();
        let pricer = HestonPricer::default();
        let atm = pricer.price_observation(&quote(100.0, 0.5, None), &truth).price;
        let observations = vec![quote(100.0, 0.5, Some(atm)), unpriceable(100.0)];

        let objective = HestonCalibrator::default()
            .objective(&observations, &truth)
            .unwrap();
        assert!((objective - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_fitted_residuals_follow_position() {
        let first = quote(100.0, 1.0, Some(10.0));
        let repeat = quote(100.0, 1.0, Some(11.0));
        let observations = vec![first, repeat, quote(110.0, 1.0, Some(6.0))];
        assert_eq!(observations[0].instrument_id, observations[1].instrument_id);

        let targets = vec![Target {
            observation: &observations[1],
            market: 11.0,
            weight: 1.0,
        }];
        let residuals = HestonCalibrator::default().fitted_residuals(
            &observations,
            &targets,
            &HestonParams::default(),
        );

        let used: Vec<bool> = residuals.iter().map(|r| r.used_in_fit).collect();
        assert_eq!(used, vec![false, true, false]);
        assert_eq!(residuals[0].market_price, 10.0);
        assert_eq!(residuals[1].market_price, 11.0);
    }

    #[test]
    fn test_restart_points_are_seeded() {
        let calibrator =
            HestonCalibrator::new(HestonCalibratorConfig::default().with_max_restarts(4).with_seed(11));
        let z0 = to_unconstrained(&HestonParams::default()).to_vec();
        let a = calibrator.starting_points(&z0).unwrap();
        let b = calibrator.starting_points(&z0).unwrap();
        assert_eq!(a.len(), 5);
        assert_eq!(a, b);
        assert_eq!(a[0], z0);
        assert_ne!(a[1], z0);
    }

    #[test]
    fn test_objective_zero_at_true_params() {
        let truth = HestonParams::new(0.04, 0.04, 2.0, 0.3, -0.5).unwrap();
        let pricer = HestonPricer::default();
        let observations: Vec<_> = [90.0, 100.0, 110.0]
            .iter()
            .map(|&k| {
                let p = pricer.price_observation(&quote(k, 0.5, None), &truth).price;
                quote(k, 0.5, Some(p))
            })
            .collect();
        let calibrator = HestonCalibrator::default();
        assert!(calibrator.objective(&observations, &truth).unwrap() < 1e-20);
        assert!(calibrator.objective(&observations, &HestonParams::default()).unwrap() > 1e-4);
    }
}
