//! Semi-analytic Heston pricing.
//!
//! European prices come from the two in-the-money probabilities
//!
//! ```text
//! P1 = ½ + 1/π ∫₀^∞ Re[e^(-iu ln K) φ(u - i) / (iu · S e^(rT))] du
//! P2 = ½ + 1/π ∫₀^∞ Re[e^(-iu ln K) φ(u) / (iu)] du
//! C  = S·P1 - K e^(-rT)·P2
//! ```
//!
//! Both integrals are truncated at an upper limit U and evaluated with
//! adaptive Gauss-Kronrod quadrature. U is doubled while the integrand
//! envelope at U is still above the tail tolerance. Puts follow from
//! put-call parity.

use num_complex::Complex64;
use pricer_core::math::quadrature::{GaussKronrod, QuadratureConfig, QuadratureResult};
use pricer_core::types::{MarketObservation, OptionContract, OptionType, PricingError};
use pricer_models::analytical::EXPIRY_EPSILON;
use pricer_models::models::{HestonCharacteristicFunction, HestonParams};
use tracing::{debug, warn};

use crate::result::{ModelTag, PricingDiagnostics, PricingResult};

/// Smallest frequency the integrands are evaluated at.
///
/// The integrands have a finite limit at u = 0 but divide by u.
pub const FREQUENCY_FLOOR: f64 = 1e-8;

/// Heston pricer configuration.
///
/// # Fields
///
/// * `quadrature` - Tolerances and subdivision budget per integral
/// * `upper_limit` - Initial truncation point U
/// * `max_upper_limit` - Cap on U after doubling
/// * `tail_tolerance` - Envelope |integrand(U)| below which U is accepted
/// * `warn_on_feller` - Warn once per batch when parameters violate 2κθ ≥ σ²
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HestonPricerConfig {
    /// Quadrature settings.
    pub quadrature: QuadratureConfig,
    /// Initial truncation point.
    pub upper_limit: f64,
    /// Largest truncation point.
    pub max_upper_limit: f64,
    /// Tail envelope tolerance.
    pub tail_tolerance: f64,
    /// Warn on Feller violations.
    pub warn_on_feller: bool,
}

impl Default for HestonPricerConfig {
    fn default() -> Self {
        Self {
            quadrature: QuadratureConfig::default(),
            upper_limit: 200.0,
            max_upper_limit: 1600.0,
            tail_tolerance: 1e-10,
            warn_on_feller: true,
        }
    }
}

impl HestonPricerConfig {
    /// Set the quadrature configuration.
    pub fn with_quadrature(mut self, quadrature: QuadratureConfig) -> Self {
        self.quadrature = quadrature;
        self
    }

    /// Set the initial truncation point.
    pub fn with_upper_limit(mut self, upper_limit: f64) -> Self {
        self.upper_limit = upper_limit;
        self
    }

    /// Set the truncation cap.
    pub fn with_max_upper_limit(mut self, max_upper_limit: f64) -> Self {
        self.max_upper_limit = max_upper_limit;
        self
    }

    /// Set the tail envelope tolerance.
    pub fn with_tail_tolerance(mut self, tail_tolerance: f64) -> Self {
        self.tail_tolerance = tail_tolerance;
        self
    }

    /// Enable or disable the Feller warning.
    pub fn with_feller_warning(mut self, enabled: bool) -> Self {
        self.warn_on_feller = enabled;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// `PricingError::InvalidInput` for non-positive limits, a cap below the
    /// initial limit, a negative tail tolerance or bad quadrature tolerances.
    pub fn validate(&self) -> Result<(), PricingError> {
        self.quadrature
            .validate()
            .map_err(|e| PricingError::invalid_input(e.to_string()))?;
        if !self.upper_limit.is_finite() || self.upper_limit <= 0.0 {
            return Err(PricingError::invalid_input(format!(
                "upper limit must be positive, got {}",
                self.upper_limit
            )));
        }
        if !self.max_upper_limit.is_finite() || self.max_upper_limit < self.upper_limit {
            return Err(PricingError::invalid_input(format!(
                "max upper limit {} below upper limit {}",
                self.max_upper_limit, self.upper_limit
            )));
        }
        if !self.tail_tolerance.is_finite() || self.tail_tolerance < 0.0 {
            return Err(PricingError::invalid_input(
                "tail tolerance must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Heston European option pricer.
///
/// # Examples
/// ```
/// use pricer_core::types::{MarketObservation, OptionContract, OptionType};
/// use pricer_models::models::HestonParams;
/// use pricer_pricing::HestonPricer;
///
/// let params = HestonParams::new(0.04, 0.04, 2.0, 0.3, -0.5).unwrap();
/// let obs = MarketObservation::new(
///     "SYN-1Y-100-C",
///     "SYN",
///     OptionContract::new(100.0, 1.0, OptionType::Call),
///     100.0,
///     0.02,
/// );
///
/// let result = HestonPricer::default().price_observation(&obs, &params);
/// assert!(result.is_ok());
/// assert!(result.price > 5.0 && result.price < 12.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HestonPricer {
    config: HestonPricerConfig,
    integrator: GaussKronrod,
}

impl HestonPricer {
    /// Create a pricer with the given configuration.
    pub fn new(config: HestonPricerConfig) -> Self {
        Self {
            integrator: GaussKronrod::new(config.quadrature),
            config,
        }
    }

    /// Get the pricer configuration.
    pub fn config(&self) -> &HestonPricerConfig {
        &self.config
    }

    /// Feller ratio 2κθ/σ² when `params` violate the condition and the
    /// warning is enabled.
    pub fn feller_violation(&self, params: &HestonParams) -> Option<f64> {
        (self.config.warn_on_feller && !params.satisfies_feller()).then(|| params.feller_ratio())
    }

    /// Price `contract` in the market state of `observation`.
    ///
    /// Never fails: input errors, parameter errors and integration failures
    /// are returned as flagged results with a NaN price.
    pub fn price(
        &self,
        contract: &OptionContract,
        observation: &MarketObservation,
        params: &HestonParams,
    ) -> PricingResult {
        let id = observation.instrument_id.as_str();
        let time_to_expiry = match validate_inputs(contract, observation) {
            Ok(t) => t,
            Err(err) => return PricingResult::flagged(id, ModelTag::Heston, err),
        };

        match self.price_european(
            observation.spot,
            contract.strike,
            observation.rate,
            time_to_expiry,
            contract.option_type,
            params,
        ) {
            Ok((price, diagnostics)) => {
                let result = PricingResult::ok(id, ModelTag::Heston, price);
                match diagnostics {
                    Some(d) => result.with_diagnostics(d),
                    None => result,
                }
            }
            Err(err) => {
                if err.is_recoverable() {
                    warn!(instrument = id, error = %err, "Heston integration failed");
                }
                PricingResult::flagged(id, ModelTag::Heston, err)
            }
        }
    }

    /// Price the observation's own contract.
    pub fn price_observation(
        &self,
        observation: &MarketObservation,
        params: &HestonParams,
    ) -> PricingResult {
        self.price(&observation.contract, observation, params)
    }

    /// Price a European option from raw inputs.
    ///
    /// Returns the price and, unless the intrinsic shortcut was taken, the
    /// integration diagnostics.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` - non-positive spot or strike, negative expiry, bad config
    /// * `InvalidParameter` - parameters outside their domain
    /// * `IntegrationFailure` - quadrature did not converge
    pub fn price_european(
        &self,
        spot: f64,
        strike: f64,
        rate: f64,
        time_to_expiry: f64,
        option_type: OptionType,
        params: &HestonParams,
    ) -> Result<(f64, Option<PricingDiagnostics>), PricingError> {
        self.config.validate()?;
        if !strike.is_finite() || strike <= 0.0 {
            return Err(PricingError::invalid_input(format!(
                "strike must be positive, got {}",
                strike
            )));
        }
        let cf = HestonCharacteristicFunction::new(*params, spot, rate, time_to_expiry)?;

        if let Some(feller_ratio) = self.feller_violation(params) {
            debug!(feller_ratio, "Heston parameters violate the Feller condition");
        }

        if time_to_expiry < EXPIRY_EPSILON {
            return Ok((option_type.intrinsic(spot, strike), None));
        }

        let forward = spot * (rate * time_to_expiry).exp();
        let discount = (-rate * time_to_expiry).exp();
        let log_strike = strike.ln();

        let upper_limit = self.upper_limit(&cf, log_strike, forward);
        let (p1, r1) = self.probability(|u| p1_integrand(&cf, log_strike, forward, u), upper_limit)?;
        let (p2, r2) = self.probability(|u| p2_integrand(&cf, log_strike, u), upper_limit)?;

        let call = spot * p1 - strike * discount * p2;
        let price = match option_type {
            OptionType::Call => call.max(0.0),
            OptionType::Put => (call - spot + strike * discount).max(0.0),
        };

        Ok((
            price,
            Some(PricingDiagnostics {
                evaluations: r1.evaluations + r2.evaluations,
                error_estimate: r1.error_estimate + r2.error_estimate,
                p1,
                p2,
                upper_limit,
            }),
        ))
    }

    /// ½ + 1/π ∫₀^U f(u) du
    fn probability<F>(&self, f: F, upper_limit: f64) -> Result<(f64, QuadratureResult), PricingError>
    where
        F: Fn(f64) -> f64,
    {
        let result = self
            .integrator
            .integrate(f, 0.0, upper_limit)
            .map_err(|e| PricingError::integration_failure(&e))?;
        Ok((0.5 + result.value / std::f64::consts::PI, result))
    }

    /// Double U until both integrand envelopes fall below the tail tolerance.
    fn upper_limit(&self, cf: &HestonCharacteristicFunction, log_strike: f64, forward: f64) -> f64 {
        let mut limit = self.config.upper_limit;
        loop {
            let envelope = tail_envelope(cf, forward, limit);
            if envelope <= self.config.tail_tolerance {
                return limit;
            }
            if limit * 2.0 > self.config.max_upper_limit {
                debug!(
                    upper_limit = limit,
                    envelope,
                    log_strike,
                    "tail envelope above tolerance at maximum upper limit"
                );
                return limit;
            }
            limit *= 2.0;
        }
    }
}

/// max(|φ(U - i)| / (U·F), |φ(U)| / U)
///
/// The strike factor e^(-iu ln K) has unit modulus and drops out.
fn tail_envelope(cf: &HestonCharacteristicFunction, forward: f64, u: f64) -> f64 {
    let shifted = cf.evaluate(Complex64::new(u, -1.0)).norm() / (u * forward);
    let plain = cf.evaluate(Complex64::new(u, 0.0)).norm() / u;
    let envelope = shifted.max(plain);
    if envelope.is_nan() {
        f64::INFINITY
    } else {
        envelope
    }
}

fn p1_integrand(cf: &HestonCharacteristicFunction, log_strike: f64, forward: f64, u: f64) -> f64 {
    let u = u.max(FREQUENCY_FLOOR);
    let phi = cf.evaluate(Complex64::new(u, -1.0));
    let kernel = Complex64::new(0.0, -u * log_strike).exp();
    (kernel * phi / Complex64::new(0.0, u * forward)).re
}

fn p2_integrand(cf: &HestonCharacteristicFunction, log_strike: f64, u: f64) -> f64 {
    let u = u.max(FREQUENCY_FLOOR);
    let phi = cf.evaluate(Complex64::new(u, 0.0));
    let kernel = Complex64::new(0.0, -u * log_strike).exp();
    (kernel * phi / Complex64::new(0.0, u)).re
}

/// Validate `contract` and the market state of `observation`, returning the
/// time to expiry.
///
/// The observation's own contract is not consulted.
fn validate_inputs(
    contract: &OptionContract,
    observation: &MarketObservation,
) -> Result<f64, PricingError> {
    contract.validate()?;
    observation.validate_market()?;
    contract.time_to_expiry(observation.valuation_time)
}
