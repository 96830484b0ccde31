//! Heston log-price characteristic function.
//!
//! Uses the "little Heston trap" formulation (Albrecher, Mayer, Schoutens and
//! Tistaert), which keeps the complex logarithm on its principal branch for
//! long maturities and large vol-of-vol:
//!
//! ```text
//! ξ = κ - σρ·iu
//! d = sqrt(ξ² + σ²(u² + iu))            principal branch, Re d ≥ 0
//! g = (ξ - d) / (ξ + d)
//! A = κθ/σ² · [(ξ - d)T - 2 ln((1 - g e^(-dT)) / (1 - g))]
//! B = (ξ - d)/σ² · (1 - e^(-dT)) / (1 - g e^(-dT))
//! φ(u) = exp(iu(ln S + rT) + A + B·v0)
//! ```
//!
//! Because Re d ≥ 0 and |g| ≤ 1 on the real axis, `e^(-dT)` stays bounded and
//! `1 - g e^(-dT)` never winds around the origin as T grows.

use num_complex::Complex64;
use pricer_core::types::PricingError;

use super::heston::HestonParams;

/// φ(u) = E[exp(iu ln S_T)] under Heston dynamics.
///
/// Parameters are validated once at construction; `evaluate` does no further
/// checking.
///
/// # Examples
/// ```
/// use num_complex::Complex64;
/// use pricer_models::models::{HestonCharacteristicFunction, HestonParams};
///
/// let params = HestonParams::new(0.04, 0.04, 2.0, 0.3, -0.5).unwrap();
/// let cf = HestonCharacteristicFunction::new(params, 100.0, 0.02, 1.0).unwrap();
///
/// let at_zero = cf.evaluate(Complex64::new(0.0, 0.0));
/// assert!((at_zero - Complex64::new(1.0, 0.0)).norm() < 1e-14);
///
/// // φ(-i) = E[S_T] = S e^(rT)
/// let forward = cf.evaluate(Complex64::new(0.0, -1.0));
/// assert!((forward.re - 100.0 * 0.02_f64.exp()).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonCharacteristicFunction {
    params: HestonParams,
    time_to_expiry: f64,
    /// ln S + rT
    log_forward: f64,
}

impl HestonCharacteristicFunction {
    /// Bind parameters and market state.
    ///
    /// # Errors
    ///
    /// * `InvalidParameter` - parameters outside their domain
    /// * `InvalidInput` - spot not positive, rate non-finite or negative time
    pub fn new(
        params: HestonParams,
        spot: f64,
        rate: f64,
        time_to_expiry: f64,
    ) -> Result<Self, PricingError> {
        params.validate()?;
        if !spot.is_finite() || spot <= 0.0 {
            return Err(PricingError::invalid_input(format!(
                "spot must be positive, got {}",
                spot
            )));
        }
        if !rate.is_finite() {
            return Err(PricingError::invalid_input("rate must be finite"));
        }
        if !time_to_expiry.is_finite() || time_to_expiry < 0.0 {
            return Err(PricingError::invalid_input(format!(
                "time to expiry must be non-negative, got {}",
                time_to_expiry
            )));
        }

        Ok(Self {
            params,
            time_to_expiry,
            log_forward: spot.ln() + rate * time_to_expiry,
        })
    }

    /// Bound parameters.
    pub fn params(&self) -> &HestonParams {
        &self.params
    }

    /// Evaluate φ at a complex frequency.
    pub fn evaluate(&self, u: Complex64) -> Complex64 {
        let HestonParams {
            v0,
            theta,
            kappa,
            sigma,
            rho,
        } = self.params;
        let t = self.time_to_expiry;
        let one = Complex64::new(1.0, 0.0);
        let iu = Complex64::i() * u;
        let sigma2 = sigma * sigma;

        let xi = kappa - sigma * rho * iu;
        let d = (xi * xi + sigma2 * (u * u + iu)).sqrt();
        let g = (xi - d) / (xi + d);
        let decay = (-d * t).exp();
        let denom = one - g * decay;

        let a = kappa * theta / sigma2 * ((xi - d) * t - 2.0 * (denom / (one - g)).ln());
        let b = (xi - d) / sigma2 * (one - decay) / denom;

        (iu * self.log_forward + a + b * v0).exp()
    }
}

/// One-shot evaluation of the Heston characteristic function.
///
/// # Errors
///
/// Same conditions as [`HestonCharacteristicFunction::new`].
pub fn evaluate(
    u: Complex64,
    params: &HestonParams,
    spot: f64,
    rate: f64,
    time_to_expiry: f64,
) -> Result<Complex64, PricingError> {
    Ok(HestonCharacteristicFunction::new(*params, spot, rate, time_to_expiry)?.evaluate(u))
}
