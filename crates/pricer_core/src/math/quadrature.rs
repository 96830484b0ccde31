//! Adaptive Gauss-Kronrod quadrature.
//!
//! The [`GaussKronrod`] integrator applies the 7-point Gauss / 15-point
//! Kronrod pair on each subinterval. The difference between the two rules is
//! the local error estimate; the interval with the largest estimate is
//! bisected until
//!
//! ```text
//! Σ err_i <= max(abs_tolerance, rel_tolerance · |Σ I_i|)
//! ```
//!
//! or the subdivision budget runs out. Neither rule samples the interval
//! endpoints, so integrands with a removable singularity at an endpoint are
//! safe to integrate as long as they are finite in the interior.
//!
//! # Example
//!
//! ```
//! use pricer_core::math::quadrature::{GaussKronrod, QuadratureConfig};
//!
//! let integrator = GaussKronrod::new(QuadratureConfig::default());
//! let result = integrator.integrate(|x: f64| x.sin(), 0.0, std::f64::consts::PI).unwrap();
//! assert!((result.value - 2.0).abs() < 1e-10);
//! ```

use crate::types::SolverError;

/// Kronrod abscissae on [-1, 1], non-negative half, descending.
/// Odd indices are the Gauss nodes; the last entry is the centre.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

/// Kronrod weights matching [`XGK`].
const WGK: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_83,
];

/// Gauss weights for the nodes `XGK[1]`, `XGK[3]`, `XGK[5]` and the centre.
const WG: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

/// Configuration for adaptive quadrature.
///
/// # Fields
///
/// * `abs_tolerance` - Absolute error target
/// * `rel_tolerance` - Error target relative to the integral estimate
/// * `max_subdivisions` - Bisections allowed before giving up
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QuadratureConfig {
    /// Absolute error target.
    pub abs_tolerance: f64,
    /// Relative error target.
    pub rel_tolerance: f64,
    /// Maximum number of bisections.
    pub max_subdivisions: usize,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self {
            abs_tolerance: 1e-10,
            rel_tolerance: 1e-8,
            max_subdivisions: 200,
        }
    }
}

impl QuadratureConfig {
    /// Set the absolute tolerance.
    pub fn with_abs_tolerance(mut self, tol: f64) -> Self {
        self.abs_tolerance = tol;
        self
    }

    /// Set the relative tolerance.
    pub fn with_rel_tolerance(mut self, tol: f64) -> Self {
        self.rel_tolerance = tol;
        self
    }

    /// Set the subdivision budget.
    pub fn with_max_subdivisions(mut self, n: usize) -> Self {
        self.max_subdivisions = n;
        self
    }

    /// Relaxed tolerances for use inside optimiser loops.
    pub fn fast() -> Self {
        Self {
            abs_tolerance: 1e-8,
            rel_tolerance: 1e-6,
            max_subdivisions: 100,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SolverError> {
        let tol_ok = |t: f64| t.is_finite() && t >= 0.0;
        if !tol_ok(self.abs_tolerance) || !tol_ok(self.rel_tolerance) {
            return Err(SolverError::InvalidConfig(
                "tolerances must be finite and non-negative".to_string(),
            ));
        }
        if self.abs_tolerance == 0.0 && self.rel_tolerance == 0.0 {
            return Err(SolverError::InvalidConfig(
                "at least one tolerance must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Converged integral with diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadratureResult {
    /// Integral estimate.
    pub value: f64,
    /// Absolute error estimate.
    pub error_estimate: f64,
    /// Integrand evaluations.
    pub evaluations: usize,
    /// Bisections performed.
    pub subdivisions: usize,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

/// Adaptive 7/15-point Gauss-Kronrod integrator.
#[derive(Debug, Clone, Default)]
pub struct GaussKronrod {
    config: QuadratureConfig,
}

impl GaussKronrod {
    /// Create an integrator with the given configuration.
    pub fn new(config: QuadratureConfig) -> Self {
        Self { config }
    }

    /// Get the integrator configuration.
    pub fn config(&self) -> &QuadratureConfig {
        &self.config
    }

    /// Integrate `f` over `[a, b]`.
    ///
    /// # Errors
    ///
    /// * `SolverError::InvalidConfig` - bad tolerances or bounds
    /// * `SolverError::NonFinite` - the integrand returned NaN or infinity
    /// * `SolverError::NotConverged` - tolerance not met within `max_subdivisions`
    pub fn integrate<F>(&self, f: F, a: f64, b: f64) -> Result<QuadratureResult, SolverError>
    where
        F: Fn(f64) -> f64,
    {
        self.config.validate()?;
        if !a.is_finite() || !b.is_finite() || a > b {
            return Err(SolverError::InvalidConfig(format!(
                "invalid integration interval [{}, {}]",
                a, b
            )));
        }
        if a == b {
            return Ok(QuadratureResult {
                value: 0.0,
                error_estimate: 0.0,
                evaluations: 0,
                subdivisions: 0,
            });
        }

        let mut evaluations = 0;
        let mut segments = vec![apply_rule(&f, a, b, &mut evaluations)?];
        let mut subdivisions = 0;

        loop {
            let (value, error) = totals(&segments);
            if error <= self.config.abs_tolerance.max(self.config.rel_tolerance * value.abs()) {
                return Ok(QuadratureResult {
                    value,
                    error_estimate: error,
                    evaluations,
                    subdivisions,
                });
            }
            if subdivisions >= self.config.max_subdivisions {
                return Err(SolverError::NotConverged {
                    evaluations,
                    estimate: value,
                    error_estimate: error,
                });
            }

            let worst = segments
                .iter()
                .enumerate()
                .max_by(|(_, x), (_, y)| x.error.total_cmp(&y.error))
                .map(|(i, _)| i)
                .unwrap_or(0);
            let seg = segments.swap_remove(worst);
            let mid = 0.5 * (seg.a + seg.b);
            segments.push(apply_rule(&f, seg.a, mid, &mut evaluations)?);
            segments.push(apply_rule(&f, mid, seg.b, &mut evaluations)?);
            subdivisions += 1;
        }
    }
}

fn totals(segments: &[Segment]) -> (f64, f64) {
    segments
        .iter()
        .fold((0.0, 0.0), |(v, e), s| (v + s.value, e + s.error))
}

/// One 15-point Kronrod evaluation with the embedded 7-point Gauss estimate.
fn apply_rule<F>(f: &F, a: f64, b: f64, evaluations: &mut usize) -> Result<Segment, SolverError>
where
    F: Fn(f64) -> f64,
{
    let centre = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    let mut eval = |x: f64| -> Result<f64, SolverError> {
        let y = f(x);
        *evaluations += 1;
        if y.is_finite() {
            Ok(y)
        } else {
            Err(SolverError::NonFinite {
                x,
                evaluations: *evaluations,
            })
        }
    };

    let fc = eval(centre)?;
    let mut kronrod = fc * WGK[7];
    let mut gauss = fc * WG[3];

    for j in 0..7 {
        let dx = half * XGK[j];
        let pair = eval(centre - dx)? + eval(centre + dx)?;
        kronrod += WGK[j] * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }

    Ok(Segment {
        a,
        b,
        value: kronrod * half,
        error: ((kronrod - gauss) * half).abs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_polynomial_exact_on_single_rule() {
        // K15 is exact for degree <= 22, G7 for degree <= 13
        let integrator = GaussKronrod::default();
        let result = integrator.integrate(|x| x.powi(6) - 3.0 * x, 0.0, 2.0).unwrap();
        assert_relative_eq!(result.value, 128.0 / 7.0 - 6.0, epsilon = 1e-12);
        assert_eq!(result.subdivisions, 0);
        assert_eq!(result.evaluations, 15);
    }

    #[test]
    fn test_oscillatory_integrand() {
        let integrator = GaussKronrod::default();
        let result = integrator.integrate(|x| (10.0 * x).cos(), 0.0, PI).unwrap();
        assert!(result.value.abs() < 1e-9);
    }

    #[test]
    fn test_removable_singularity_at_endpoint() {
        // sin(x)/x -> 1 at 0; the rule never samples x = 0
        let integrator = GaussKronrod::default();
        let result = integrator.integrate(|x| x.sin() / x, 0.0, 1.0).unwrap();
        assert_relative_eq!(result.value, 0.946_083_070_367_183, epsilon = 1e-10);
    }

    #[test]
    fn test_peaked_integrand_subdivides() {
        let integrator = GaussKronrod::default();
        let result = integrator
            .integrate(|x| 1.0 / (1e-4 + x * x), -1.0, 1.0)
            .unwrap();
        let exact = 2.0 * (1.0_f64 / 1e-2).atan() / 1e-2;
        assert_relative_eq!(result.value, exact, max_relative = 1e-7);
        assert!(result.subdivisions > 0);
    }

    #[test]
    fn test_budget_exhausted() {
        let config = QuadratureConfig::default().with_max_subdivisions(2);
        let integrator = GaussKronrod::new(config);
        let err = integrator
            .integrate(|x| (1.0 / (x + 1e-3)).sin(), 0.0, 1.0)
            .unwrap_err();
        match err {
            SolverError::NotConverged { evaluations, .. } => assert_eq!(evaluations, 75),
            other => panic!("Expected NotConverged, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_integrand() {
        let integrator = GaussKronrod::default();
        let err = integrator.integrate(|_| f64::NAN, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, SolverError::NonFinite { .. }));
    }

    #[test]
    fn test_invalid_interval() {
        let integrator = GaussKronrod::default();
        assert!(matches!(
            integrator.integrate(|x| x, 1.0, 0.0),
            Err(SolverError::InvalidConfig(_))
        ));
        assert_eq!(integrator.integrate(|x| x, 1.0, 1.0).unwrap().value, 0.0);
    }

    #[test]
    fn test_invalid_tolerances() {
        let config = QuadratureConfig::default()
            .with_abs_tolerance(0.0)
            .with_rel_tolerance(0.0);
        assert!(config.validate().is_err());
        assert!(QuadratureConfig::default().validate().is_ok());
    }
}
