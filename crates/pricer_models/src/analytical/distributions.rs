//! Standard normal distribution functions.
//!
//! - `norm_cdf`: Cumulative distribution function (CDF)
//! - `norm_pdf`: Probability density function (PDF)
//!
//! Both are generic over `T: Float`. The CDF goes through the Abramowitz and
//! Stegun 7.1.26 erfc approximation (max absolute error 1.5e-7), which is
//! exactly antisymmetric: `norm_cdf(x) + norm_cdf(-x) == 1`.

use num_traits::Float;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// A&S 7.1.26 polynomial coefficients, lowest order first.
const ERFC_COEFFS: [f64; 5] = [
    0.254_829_592,
    -0.284_496_736,
    1.421_413_741,
    -1.453_152_027,
    1.061_405_429,
];

/// A&S 7.1.26 rational argument scale.
const ERFC_P: f64 = 0.327_591_1;

#[inline]
fn lit<T: Float>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::nan)
}

/// Complementary error function, A&S 7.1.26.
///
/// erfc(x) = (2/√π) ∫_x^∞ e^(-t²) dt, using erfc(-x) = 2 - erfc(x) for x < 0.
#[inline]
fn erfc_approx<T: Float>(x: T) -> T {
    let abs_x = x.abs();
    let t = T::one() / (T::one() + lit::<T>(ERFC_P) * abs_x);

    // Horner
    let poly = ERFC_COEFFS
        .iter()
        .rev()
        .fold(T::zero(), |acc, &c| lit::<T>(c) + t * acc);

    let erfc_abs = t * poly * (-abs_x * abs_x).exp();
    if x < T::zero() {
        lit::<T>(2.0) - erfc_abs
    } else {
        erfc_abs
    }
}

/// Standard normal cumulative distribution function.
///
/// Φ(x) = ½ · erfc(-x / √2)
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
/// assert!((norm_cdf(1.959_964_f64) - 0.975).abs() < 1e-6);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    lit::<T>(0.5) * erfc_approx(-x / lit::<T>(std::f64::consts::SQRT_2))
}

/// Standard normal probability density function.
///
/// φ(x) = (1 / √(2π)) · exp(-x² / 2)
///
/// # Examples
/// ```
/// use pricer_models::analytical::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0_f64) - 0.398_942_280_4).abs() < 1e-9);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    lit::<T>(FRAC_1_SQRT_2PI) * (lit::<T>(-0.5) * x * x).exp()
}
