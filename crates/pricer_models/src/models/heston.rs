//! Heston stochastic volatility model parameters.
//!
//! The Heston model is described by the SDEs
//! ```text
//! dS = r · S · dt + sqrt(v) · S · dW_S
//! dv = κ · (θ - v) · dt + σ · sqrt(v) · dW_v
//! E[dW_S · dW_v] = ρ · dt
//! ```
//! where:
//! - v0 = initial variance
//! - θ = long-run variance
//! - κ = mean reversion speed
//! - σ = volatility of variance (vol-of-vol)
//! - ρ = correlation between spot and variance shocks
//!
//! ## Feller condition
//!
//! `2κθ ≥ σ²` keeps the variance process away from zero. Calibrated parameter
//! sets frequently violate it; a violation is reported, never rejected.
//!
//! ## Example
//!
//! ```
//! use pricer_models::models::heston::HestonParams;
//!
//! let params = HestonParams::new(0.04, 0.04, 2.0, 0.3, -0.5).unwrap();
//! assert!(params.satisfies_feller());
//! assert!((params.feller_ratio() - 0.16 / 0.09).abs() < 1e-12);
//! ```

use pricer_core::types::PricingError;

/// Number of free Heston parameters.
pub const HESTON_PARAM_COUNT: usize = 5;

/// Heston model parameters.
///
/// # Fields
///
/// * `v0` - Initial variance (v0 > 0)
/// * `theta` - Long-run variance (θ > 0)
/// * `kappa` - Mean reversion speed (κ > 0)
/// * `sigma` - Vol-of-vol (σ > 0)
/// * `rho` - Spot/variance correlation (-1 ≤ ρ ≤ 1)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonParams {
    /// Initial variance.
    pub v0: f64,
    /// Long-run variance.
    pub theta: f64,
    /// Mean reversion speed.
    pub kappa: f64,
    /// Vol-of-vol.
    pub sigma: f64,
    /// Correlation.
    pub rho: f64,
}

impl Default for HestonParams {
    /// A moderate crypto-style starting point: 60% vol, mild negative skew.
    fn default() -> Self {
        Self {
            v0: 0.36,
            theta: 0.36,
            kappa: 2.0,
            sigma: 1.0,
            rho: -0.3,
        }
    }
}

impl HestonParams {
    /// Create validated parameters.
    ///
    /// # Errors
    ///
    /// `PricingError::InvalidParameter` if any value is outside its domain.
    pub fn new(v0: f64, theta: f64, kappa: f64, sigma: f64, rho: f64) -> Result<Self, PricingError> {
        let params = Self {
            v0,
            theta,
            kappa,
            sigma,
            rho,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check every parameter against its domain.
    ///
    /// v0 = 0 is admitted: the characteristic function is well defined there.
    pub fn validate(&self) -> Result<(), PricingError> {
        for (name, value) in self.named() {
            if !value.is_finite() {
                return Err(PricingError::invalid_parameter(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        if self.v0 < 0.0 {
            return Err(PricingError::invalid_parameter(format!(
                "v0 must be non-negative, got {}",
                self.v0
            )));
        }
        for (name, value) in [
            ("theta", self.theta),
            ("kappa", self.kappa),
            ("sigma", self.sigma),
        ] {
            if value <= 0.0 {
                return Err(PricingError::invalid_parameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(-1.0..=1.0).contains(&self.rho) {
            return Err(PricingError::invalid_parameter(format!(
                "rho must lie in [-1, 1], got {}",
                self.rho
            )));
        }
        Ok(())
    }

    /// Check the Feller condition 2κθ ≥ σ².
    #[inline]
    pub fn satisfies_feller(&self) -> bool {
        self.feller_ratio() >= 1.0
    }

    /// 2κθ / σ². Values below one violate the Feller condition.
    #[inline]
    pub fn feller_ratio(&self) -> f64 {
        2.0 * self.kappa * self.theta / (self.sigma * self.sigma)
    }

    /// Parameters in `[v0, theta, kappa, sigma, rho]` order.
    pub fn to_array(&self) -> [f64; HESTON_PARAM_COUNT] {
        [self.v0, self.theta, self.kappa, self.sigma, self.rho]
    }

    /// Inverse of [`HestonParams::to_array`]. Not validated.
    pub fn from_array(values: [f64; HESTON_PARAM_COUNT]) -> Self {
        let [v0, theta, kappa, sigma, rho] = values;
        Self {
            v0,
            theta,
            kappa,
            sigma,
            rho,
        }
    }

    /// Parameter names paired with values, in array order.
    pub fn named(&self) -> [(&'static str, f64); HESTON_PARAM_COUNT] {
        [
            ("v0", self.v0),
            ("theta", self.theta),
            ("kappa", self.kappa),
            ("sigma", self.sigma),
            ("rho", self.rho),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_valid() {
        let p = HestonParams::new(0.04, 0.05, 1.5, 0.4, -0.7).unwrap();
        assert_eq!(p.to_array(), [0.04, 0.05, 1.5, 0.4, -0.7]);
        assert_eq!(HestonParams::from_array(p.to_array()), p);
    }

    #[test]
    fn test_default_is_valid() {
        assert!(HestonParams::default().validate().is_ok());
    }

    #[test]
    fn test_domain_violations() {
        let bad = [
            [-0.01, 0.04, 2.0, 0.3, -0.5],
            [0.04, 0.0, 2.0, 0.3, -0.5],
            [0.04, 0.04, -1.0, 0.3, -0.5],
            [0.04, 0.04, 2.0, 0.0, -0.5],
            [0.04, 0.04, 2.0, 0.3, -1.01],
            [0.04, 0.04, 2.0, 0.3, f64::NAN],
            [0.04, f64::INFINITY, 2.0, 0.3, 0.0],
        ];
        for values in bad {
            let err = HestonParams::from_array(values).validate().unwrap_err();
            assert!(matches!(err, PricingError::InvalidParameter(_)), "{:?}", values);
        }
    }

    #[test]
    fn test_boundary_values_accepted() {
        assert!(HestonParams::new(0.0, 0.04, 2.0, 0.3, 1.0).is_ok());
        assert!(HestonParams::new(0.04, 0.04, 2.0, 0.3, -1.0).is_ok());
    }

    #[test]
    fn test_feller() {
        let ok = HestonParams::new(0.04, 0.04, 2.0, 0.3, -0.5).unwrap();
        assert!(ok.satisfies_feller());

        let violated = HestonParams::new(0.09, 0.09, 1.0, 1.5, -0.7).unwrap();
        assert!(!violated.satisfies_feller());
        assert_relative_eq!(violated.feller_ratio(), 0.18 / 2.25, epsilon = 1e-12);
    }
}
