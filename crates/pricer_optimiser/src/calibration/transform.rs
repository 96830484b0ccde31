//! Unconstrained parameterisation of the Heston domain.
//!
//! ```text
//! z = [ln v0, ln θ, ln κ, ln σ, atanh ρ]
//! ```
//!
//! Every finite z maps to an admissible parameter set, so optimisers can
//! search freely without ever asking the pricer for an invalid point.

use pricer_models::models::{HestonParams, HESTON_PARAM_COUNT};

/// |ρ| is pulled below this before atanh.
pub const RHO_LIMIT: f64 = 0.999;

/// Positive parameters are floored here before taking logs.
pub const POSITIVE_FLOOR: f64 = 1e-8;

/// Map admissible parameters into unconstrained space.
///
/// # Examples
/// ```
/// use pricer_models::models::HestonParams;
/// use pricer_optimiser::calibration::transform::{to_constrained, to_unconstrained};
///
/// let params = HestonParams::new(0.04, 0.04, 2.0, 0.3, -0.5).unwrap();
/// let back = to_constrained(&to_unconstrained(&params));
/// assert!((back.kappa - 2.0).abs() < 1e-12);
/// assert!((back.rho + 0.5).abs() < 1e-12);
/// ```
pub fn to_unconstrained(params: &HestonParams) -> [f64; HESTON_PARAM_COUNT] {
    let log = |x: f64| x.max(POSITIVE_FLOOR).ln();
    [
        log(params.v0),
        log(params.theta),
        log(params.kappa),
        log(params.sigma),
        params.rho.clamp(-RHO_LIMIT, RHO_LIMIT).atanh(),
    ]
}

/// Map an unconstrained vector back onto the parameter domain.
///
/// The result is not validated: overflowing coordinates produce infinite
/// parameters, which the pricer rejects.
pub fn to_constrained(z: &[f64]) -> HestonParams {
    HestonParams {
        v0: z[0].exp(),
        theta: z[1].exp(),
        kappa: z[2].exp(),
        sigma: z[3].exp(),
        rho: z[4].tanh(),
    }
}
