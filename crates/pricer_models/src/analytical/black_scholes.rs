//! Black-Scholes pricing model for European options.
//!
//! This module provides the Black-Scholes model for pricing European
//! call and put options with analytical Greeks calculations.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put Price**: P = K·e^(-rT)·N(-d₂) - S·N(-d₁)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T
//!
//! ## Degenerate cases
//!
//! - T below [`EXPIRY_EPSILON`]: intrinsic value max(S - K, 0) / max(K - S, 0)
//! - σ = 0 with T above it: discounted forward intrinsic,
//!   max(S - K·e^(-rT), 0) / max(K·e^(-rT) - S, 0)

use num_traits::Float;
use pricer_core::types::{OptionType, PricingError};

use super::distributions::{norm_cdf, norm_pdf};
use super::error::AnalyticalError;

/// Times to expiry below this are treated as expired.
pub const EXPIRY_EPSILON: f64 = 1e-8;

/// Analytical sensitivities of a European option.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greeks<T> {
    /// ∂V/∂S
    pub delta: T,
    /// ∂²V/∂S²
    pub gamma: T,
    /// ∂V/∂σ
    pub vega: T,
    /// ∂V/∂t (calendar time, per year)
    pub theta: T,
    /// ∂V/∂r
    pub rho: T,
}

/// Black-Scholes model for European option pricing.
///
/// # Type Parameters
/// * `T` - Floating-point type implementing `Float` (e.g., `f64`, `f32`)
///
/// # Examples
/// ```
/// use pricer_models::analytical::BlackScholes;
/// use pricer_core::types::OptionType;
///
/// let bs = BlackScholes::new(100.0_f64, 0.05, 0.2).unwrap();
/// let call = bs.price(100.0, 1.0, OptionType::Call);
/// let put = bs.price(100.0, 1.0, OptionType::Put);
///
/// // Put-call parity: C - P = S - K*exp(-rT)
/// let parity = call - put - (100.0 - 100.0 * (-0.05_f64).exp());
/// assert!(parity.abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholes<T: Float> {
    /// Spot price (S)
    spot: T,
    /// Risk-free interest rate (r)
    rate: T,
    /// Volatility (σ)
    volatility: T,
}

impl<T: Float> BlackScholes<T> {
    /// Creates a new Black-Scholes model.
    ///
    /// # Errors
    /// - `AnalyticalError::NonFinite` if any input is NaN or infinite
    /// - `AnalyticalError::InvalidSpot` if spot <= 0
    /// - `AnalyticalError::InvalidVolatility` if volatility < 0
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    ///
    /// assert!(BlackScholes::new(100.0_f64, 0.05, 0.0).is_ok());
    /// assert!(BlackScholes::new(-100.0_f64, 0.05, 0.2).is_err());
    /// assert!(BlackScholes::new(100.0_f64, 0.05, -0.2).is_err());
    /// ```
    pub fn new(spot: T, rate: T, volatility: T) -> Result<Self, AnalyticalError> {
        for (name, value) in [("spot", spot), ("rate", rate), ("volatility", volatility)] {
            if !value.is_finite() {
                return Err(AnalyticalError::NonFinite {
                    name: name.to_string(),
                });
            }
        }

        if spot <= T::zero() {
            return Err(AnalyticalError::InvalidSpot {
                spot: spot.to_f64().unwrap_or(f64::NAN),
            });
        }

        if volatility < T::zero() {
            return Err(AnalyticalError::InvalidVolatility {
                volatility: volatility.to_f64().unwrap_or(f64::NAN),
            });
        }

        Ok(Self {
            spot,
            rate,
            volatility,
        })
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> T {
        self.spot
    }

    /// Returns the risk-free rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.rate
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> T {
        self.volatility
    }

    #[inline]
    fn is_expired(expiry: T) -> bool {
        expiry < T::from(EXPIRY_EPSILON).unwrap_or_else(T::zero)
    }

    #[inline]
    fn is_deterministic(&self) -> bool {
        self.volatility == T::zero()
    }

    /// Computes the d1 term of the Black-Scholes formula.
    ///
    /// d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
    ///
    /// Infinite when σ√T = 0 and the forward is away from the strike.
    #[inline]
    pub fn d1(&self, strike: T, expiry: T) -> T {
        let half = T::from(0.5).unwrap_or_else(T::nan);
        let log_moneyness = (self.spot / strike).ln();
        let drift = (self.rate + half * self.volatility * self.volatility) * expiry;
        (log_moneyness + drift) / (self.volatility * expiry.sqrt())
    }

    /// Computes the d2 term of the Black-Scholes formula.
    ///
    /// d₂ = d₁ - σ√T
    #[inline]
    pub fn d2(&self, strike: T, expiry: T) -> T {
        self.d1(strike, expiry) - self.volatility * expiry.sqrt()
    }

    /// European option price.
    ///
    /// # Arguments
    /// * `strike` - Strike price (K)
    /// * `expiry` - Time to expiration in years (T)
    /// * `option_type` - Call or put
    pub fn price(&self, strike: T, expiry: T, option_type: OptionType) -> T {
        match option_type {
            OptionType::Call => self.price_call(strike, expiry),
            OptionType::Put => self.price_put(strike, expiry),
        }
    }

    /// Computes European call option price.
    ///
    /// C = S·N(d₁) - K·e^(-rT)·N(d₂)
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    ///
    /// let bs = BlackScholes::new(100.0_f64, 0.05, 0.2).unwrap();
    /// assert!((bs.price_call(100.0, 1.0) - 10.4506).abs() < 1e-3);
    /// ```
    pub fn price_call(&self, strike: T, expiry: T) -> T {
        if Self::is_expired(expiry) {
            return (self.spot - strike).max(T::zero());
        }

        let discounted_strike = strike * (-self.rate * expiry).exp();
        if self.is_deterministic() {
            return (self.spot - discounted_strike).max(T::zero());
        }

        let d1 = self.d1(strike, expiry);
        let d2 = self.d2(strike, expiry);
        let price = self.spot * norm_cdf(d1) - discounted_strike * norm_cdf(d2);
        price.max(T::zero())
    }

    /// Computes European put option price.
    ///
    /// P = K·e^(-rT)·N(-d₂) - S·N(-d₁)
    pub fn price_put(&self, strike: T, expiry: T) -> T {
        if Self::is_expired(expiry) {
            return (strike - self.spot).max(T::zero());
        }

        let discounted_strike = strike * (-self.rate * expiry).exp();
        if self.is_deterministic() {
            return (discounted_strike - self.spot).max(T::zero());
        }

        let d1 = self.d1(strike, expiry);
        let d2 = self.d2(strike, expiry);
        let price = discounted_strike * norm_cdf(-d2) - self.spot * norm_cdf(-d1);
        price.max(T::zero())
    }

    /// Computes Delta (∂V/∂S).
    ///
    /// - Call Delta = N(d₁)
    /// - Put Delta = N(d₁) - 1
    ///
    /// Step function of moneyness when expired or σ = 0.
    pub fn delta(&self, strike: T, expiry: T, option_type: OptionType) -> T {
        let one = T::one();
        let zero = T::zero();

        let call_delta = if Self::is_expired(expiry) {
            if self.spot > strike {
                one
            } else {
                zero
            }
        } else if self.is_deterministic() {
            if self.spot > strike * (-self.rate * expiry).exp() {
                one
            } else {
                zero
            }
        } else {
            norm_cdf(self.d1(strike, expiry))
        };

        match option_type {
            OptionType::Call => call_delta,
            OptionType::Put => call_delta - one,
        }
    }

    /// Computes Gamma (∂²V/∂S²).
    ///
    /// Gamma = φ(d₁) / (S·σ·√T), same for calls and puts.
    pub fn gamma(&self, strike: T, expiry: T) -> T {
        if Self::is_expired(expiry) || self.is_deterministic() {
            return T::zero();
        }
        let d1 = self.d1(strike, expiry);
        norm_pdf(d1) / (self.spot * self.volatility * expiry.sqrt())
    }

    /// Computes Vega (∂V/∂σ).
    ///
    /// Vega = S·√T·φ(d₁), same for calls and puts.
    pub fn vega(&self, strike: T, expiry: T) -> T {
        if Self::is_expired(expiry) || self.is_deterministic() {
            return T::zero();
        }
        let d1 = self.d1(strike, expiry);
        self.spot * expiry.sqrt() * norm_pdf(d1)
    }

    /// Computes Theta (∂V/∂t).
    ///
    /// - Call Theta = -(S·σ·φ(d₁))/(2√T) - r·K·e^(-rT)·N(d₂)
    /// - Put Theta = -(S·σ·φ(d₁))/(2√T) + r·K·e^(-rT)·N(-d₂)
    pub fn theta(&self, strike: T, expiry: T, option_type: OptionType) -> T {
        if Self::is_expired(expiry) || self.is_deterministic() {
            return T::zero();
        }

        let d1 = self.d1(strike, expiry);
        let d2 = self.d2(strike, expiry);
        let two = T::one() + T::one();
        let decay = -(self.spot * self.volatility * norm_pdf(d1)) / (two * expiry.sqrt());
        let carry = self.rate * strike * (-self.rate * expiry).exp();

        match option_type {
            OptionType::Call => decay - carry * norm_cdf(d2),
            OptionType::Put => decay + carry * norm_cdf(-d2),
        }
    }

    /// Computes Rho (∂V/∂r).
    ///
    /// - Call Rho = K·T·e^(-rT)·N(d₂)
    /// - Put Rho = -K·T·e^(-rT)·N(-d₂)
    pub fn rho(&self, strike: T, expiry: T, option_type: OptionType) -> T {
        if Self::is_expired(expiry) || self.is_deterministic() {
            return T::zero();
        }

        let d2 = self.d2(strike, expiry);
        let scale = strike * expiry * (-self.rate * expiry).exp();

        match option_type {
            OptionType::Call => scale * norm_cdf(d2),
            OptionType::Put => -scale * norm_cdf(-d2),
        }
    }

    /// All five Greeks at once.
    pub fn greeks(&self, strike: T, expiry: T, option_type: OptionType) -> Greeks<T> {
        Greeks {
            delta: self.delta(strike, expiry, option_type),
            gamma: self.gamma(strike, expiry),
            vega: self.vega(strike, expiry),
            theta: self.theta(strike, expiry, option_type),
            rho: self.rho(strike, expiry, option_type),
        }
    }
}

/// Validated closed-form price.
///
/// # Errors
///
/// `PricingError::InvalidInput` when spot <= 0, strike <= 0, volatility < 0,
/// time_to_expiry < 0 or any input is non-finite.
///
/// # Examples
/// ```
/// use pricer_models::analytical::black_scholes;
/// use pricer_core::types::OptionType;
///
/// let call = black_scholes::price(50_000.0, 52_000.0, 0.0, 0.8, 0.25, OptionType::Call).unwrap();
/// assert!((call - 7_122.80).abs() < 1.0);
/// ```
pub fn price(
    spot: f64,
    strike: f64,
    rate: f64,
    volatility: f64,
    time_to_expiry: f64,
    option_type: OptionType,
) -> Result<f64, PricingError> {
    validate_contract_inputs(strike, time_to_expiry)?;
    let model = BlackScholes::new(spot, rate, volatility)?;
    Ok(model.price(strike, time_to_expiry, option_type))
}

/// Validated Greeks.
///
/// # Errors
///
/// Same conditions as [`price`].
pub fn greeks(
    spot: f64,
    strike: f64,
    rate: f64,
    volatility: f64,
    time_to_expiry: f64,
    option_type: OptionType,
) -> Result<Greeks<f64>, PricingError> {
    validate_contract_inputs(strike, time_to_expiry)?;
    let model = BlackScholes::new(spot, rate, volatility)?;
    Ok(model.greeks(strike, time_to_expiry, option_type))
}

/// Volatility bracket searched by [`implied_volatility`].
pub const IMPLIED_VOLATILITY_BOUNDS: (f64, f64) = (1e-4, 5.0);

/// Volatility that reproduces `price`.
///
/// Newton steps on vega, falling back to bisection whenever a step leaves
/// the current bracket. Starts from the Brenner-Subrahmanyam approximation.
///
/// # Errors
///
/// `PricingError::InvalidInput` for invalid contract inputs, expired
/// contracts, or a premium outside the prices attainable within
/// [`IMPLIED_VOLATILITY_BOUNDS`].
///
/// # Examples
/// ```
/// use pricer_models::analytical::black_scholes;
/// use pricer_core::types::OptionType;
///
/// let vol = black_scholes::implied_volatility(7_122.80, 50_000.0, 52_000.0, 0.0, 0.25, OptionType::Call).unwrap();
/// assert!((vol - 0.8).abs() < 1e-4);
/// ```
pub fn implied_volatility(
    price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    time_to_expiry: f64,
    option_type: OptionType,
) -> Result<f64, PricingError> {
    validate_contract_inputs(strike, time_to_expiry)?;
    if !price.is_finite() {
        return Err(AnalyticalError::NonFinite {
            name: "price".to_string(),
        }
        .into());
    }

    let (mut lo, mut hi) = IMPLIED_VOLATILITY_BOUNDS;
    let lower = BlackScholes::new(spot, rate, lo)?.price(strike, time_to_expiry, option_type);
    let upper = BlackScholes::new(spot, rate, hi)?.price(strike, time_to_expiry, option_type);
    if time_to_expiry < EXPIRY_EPSILON || price < lower || price > upper {
        return Err(AnalyticalError::PriceOutOfBounds {
            price,
            lower,
            upper,
        }
        .into());
    }

    let tolerance = 1e-12 * spot.max(1.0);
    let mut vol = ((2.0 * std::f64::consts::PI / time_to_expiry).sqrt() * price / spot).clamp(lo, hi);
    for _ in 0..100 {
        let model = BlackScholes::new(spot, rate, vol)?;
        let diff = model.price(strike, time_to_expiry, option_type) - price;
        if diff.abs() <= tolerance {
            break;
        }
        if diff > 0.0 {
            hi = vol;
        } else {
            lo = vol;
        }
        if hi - lo < 1e-14 {
            break;
        }

        let vega = model.vega(strike, time_to_expiry);
        let newton = vol - diff / vega;
        vol = if vega > 0.0 && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
    }
    Ok(vol)
}

fn validate_contract_inputs(strike: f64, time_to_expiry: f64) -> Result<(), AnalyticalError> {
    if !strike.is_finite() {
        return Err(AnalyticalError::NonFinite {
            name: "strike".to_string(),
        });
    }
    if strike <= 0.0 {
        return Err(AnalyticalError::InvalidStrike { strike });
    }
    if !time_to_expiry.is_finite() {
        return Err(AnalyticalError::NonFinite {
            name: "time_to_expiry".to_string(),
        });
    }
    if time_to_expiry < 0.0 {
        return Err(AnalyticalError::InvalidExpiry {
            expiry: time_to_expiry,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    // ==========================================================
    // Implied Volatility Tests
    // ==========================================================

    #[test]
    fn test_implied_volatility_recovers_input() {
        for (strike, option_type) in [
            (30_000.0, OptionType::Put),
            (50_000.0, OptionType::Call),
            (80_000.0, OptionType::Call),
        ] {
            let premium = price(50_000.0, strike, 0.03, 0.65, 0.5, option_type).unwrap();
            let vol = implied_volatility(premium, 50_000.0, strike, 0.03, 0.5, option_type).unwrap();
            assert_relative_eq!(vol, 0.65, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_implied_volatility_below_intrinsic() {
        let err = implied_volatility(1.0, 100.0, 80.0, 0.0, 1.0, OptionType::Call).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput(_)));
    }

    #[test]
    fn test_implied_volatility_expired() {
        assert!(implied_volatility(5.0, 100.0, 95.0, 0.0, 0.0, OptionType::Call).is_err());
    }

    // ==========================================================
    // Constructor Tests
    // ==========================================================

    #[test]
    fn test_new_valid_parameters() {
        let bs = BlackScholes::new(100.0_f64, 0.05, 0.2).unwrap();
        assert_eq!(bs.spot(), 100.0);
        assert_eq!(bs.rate(), 0.05);
        assert_eq!(bs.volatility(), 0.2);
    }

    #[test]
    fn test_new_invalid_spot() {
        match BlackScholes::new(-100.0_f64, 0.05, 0.2).unwrap_err() {
            AnalyticalError::InvalidSpot { spot } => assert_eq!(spot, -100.0),
            other => panic!("Expected InvalidSpot error, got {:?}", other),
        }
        assert!(BlackScholes::new(0.0_f64, 0.05, 0.2).is_err());
    }

    #[test]
    fn test_new_invalid_volatility() {
        match BlackScholes::new(100.0_f64, 0.05, -0.2).unwrap_err() {
            AnalyticalError::InvalidVolatility { volatility } => assert_eq!(volatility, -0.2),
            other => panic!("Expected InvalidVolatility error, got {:?}", other),
        }
    }

    #[test]
    fn test_new_non_finite() {
        assert!(matches!(
            BlackScholes::new(100.0_f64, f64::NAN, 0.2),
            Err(AnalyticalError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_negative_rate_allowed() {
        assert!(BlackScholes::new(100.0_f64, -0.02, 0.2).is_ok());
    }

    // ==========================================================
    // d1/d2 Tests
    // ==========================================================

    #[test]
    fn test_d1_d2_atm() {
        // ATM with r=0: d1 = σ√T / 2, d2 = -σ√T / 2
        let bs = BlackScholes::new(100.0_f64, 0.0, 0.2).unwrap();
        assert_relative_eq!(bs.d1(100.0, 1.0), 0.1, epsilon = 1e-12);
        assert_relative_eq!(bs.d2(100.0, 1.0), -0.1, epsilon = 1e-12);
    }

    // ==========================================================
    // Pricing Tests
    // ==========================================================

    #[test]
    fn test_reference_call() {
        // Hull: S=100, K=100, r=5%, σ=20%, T=1
        let bs = BlackScholes::new(100.0_f64, 0.05, 0.2).unwrap();
        assert_relative_eq!(bs.price_call(100.0, 1.0), 10.450_583_572, epsilon = 1e-4);
        assert_relative_eq!(bs.price_put(100.0, 1.0), 5.573_526_022, epsilon = 1e-4);
    }

    #[test]
    fn test_crypto_reference_call() {
        let call = price(50_000.0, 52_000.0, 0.0, 0.8, 0.25, OptionType::Call).unwrap();
        assert_relative_eq!(call, 7_122.800_879, epsilon = 1.0);
    }

    #[test]
    fn test_expired_returns_intrinsic() {
        let bs = BlackScholes::new(110.0_f64, 0.05, 0.5).unwrap();
        assert_eq!(bs.price_call(100.0, 0.0), 10.0);
        assert_eq!(bs.price_put(100.0, 0.0), 0.0);
        assert_eq!(bs.price_put(120.0, 1e-9), 10.0);
    }

    #[test]
    fn test_short_expiry_converges_to_intrinsic() {
        let bs = BlackScholes::new(110.0_f64, 0.05, 0.3).unwrap();
        let price = bs.price_call(100.0, 1e-7);
        assert!((price - 10.0).abs() < 1e-5);
        let otm = bs.price_put(100.0, 1e-7);
        assert!(otm < 1e-6);
    }

    #[test]
    fn test_zero_volatility_forward_intrinsic() {
        let bs = BlackScholes::new(100.0_f64, 0.05, 0.0).unwrap();
        let df = (-0.05_f64).exp();
        assert_relative_eq!(bs.price_call(100.0, 1.0), 100.0 - 100.0 * df, epsilon = 1e-12);
        assert_eq!(bs.price_put(100.0, 1.0), 0.0);
        assert_relative_eq!(bs.price_put(110.0, 1.0), 110.0 * df - 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_free_function_validation() {
        let cases = [
            (0.0, 100.0, 0.2, 1.0),
            (100.0, 0.0, 0.2, 1.0),
            (100.0, -5.0, 0.2, 1.0),
            (100.0, 100.0, -0.1, 1.0),
            (100.0, 100.0, 0.2, -1.0),
            (f64::INFINITY, 100.0, 0.2, 1.0),
        ];
        for (s, k, v, t) in cases {
            let err = price(s, k, 0.0, v, t, OptionType::Call).unwrap_err();
            assert!(matches!(err, PricingError::InvalidInput(_)), "{:?}", (s, k, v, t));
        }
    }

    // ==========================================================
    // Greeks Tests
    // ==========================================================

    #[test]
    fn test_greeks_vs_finite_difference() {
        let (s, k, r, v, t) = (100.0_f64, 105.0, 0.03, 0.25, 0.75);
        let bs = BlackScholes::new(s, r, v).unwrap();
        let g = bs.greeks(k, t, OptionType::Call);
        let h = 1e-4;

        let up = BlackScholes::new(s + h, r, v).unwrap().price_call(k, t);
        let dn = BlackScholes::new(s - h, r, v).unwrap().price_call(k, t);
        let mid = bs.price_call(k, t);
        assert_relative_eq!(g.delta, (up - dn) / (2.0 * h), epsilon = 1e-4);
        assert_relative_eq!(g.gamma, (up - 2.0 * mid + dn) / (h * h), epsilon = 1e-3);

        let vu = BlackScholes::new(s, r, v + h).unwrap().price_call(k, t);
        let vd = BlackScholes::new(s, r, v - h).unwrap().price_call(k, t);
        assert_relative_eq!(g.vega, (vu - vd) / (2.0 * h), epsilon = 1e-3);

        let ru = BlackScholes::new(s, r + h, v).unwrap().price_call(k, t);
        let rd = BlackScholes::new(s, r - h, v).unwrap().price_call(k, t);
        assert_relative_eq!(g.rho, (ru - rd) / (2.0 * h), epsilon = 1e-3);

        // Theta is -∂V/∂T
        let tu = bs.price_call(k, t + h);
        let td = bs.price_call(k, t - h);
        assert_relative_eq!(g.theta, -(tu - td) / (2.0 * h), epsilon = 1e-3);
    }

    #[test]
    fn test_put_delta_relation() {
        let bs = BlackScholes::new(100.0_f64, 0.05, 0.2).unwrap();
        let call = bs.delta(90.0, 0.5, OptionType::Call);
        let put = bs.delta(90.0, 0.5, OptionType::Put);
        assert_relative_eq!(call - put, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_greeks() {
        let bs = BlackScholes::new(100.0_f64, 0.05, 0.0).unwrap();
        let g = bs.greeks(100.0, 1.0, OptionType::Call);
        assert_eq!(g.delta, 1.0);
        assert_eq!(g.gamma, 0.0);
        assert_eq!(g.vega, 0.0);
    }

    proptest! {
        #[test]
        fn prop_put_call_parity(
            s in 10.0f64..200.0,
            k in 10.0f64..200.0,
            r in -0.02f64..0.1,
            v in 0.05f64..1.5,
            t in 0.01f64..3.0,
        ) {
            let bs = BlackScholes::new(s, r, v).unwrap();
            let call = bs.price_call(k, t);
            let put = bs.price_put(k, t);
            let forward = s - k * (-r * t).exp();
            // Clamping at zero can only bite when the unclamped value is
            // below the approximation error.
            prop_assert!((call - put - forward).abs() < 1e-6 * s.max(k));
        }

        #[test]
        fn prop_price_bounds(
            s in 10.0f64..200.0,
            k in 10.0f64..200.0,
            v in 0.05f64..1.5,
            t in 0.01f64..3.0,
        ) {
            let bs = BlackScholes::new(s, 0.02, v).unwrap();
            let call = bs.price_call(k, t);
            prop_assert!(call >= (s - k * (-0.02 * t).exp()).max(0.0) - 1e-5 * s);
            prop_assert!(call <= s);
        }
    }
}
