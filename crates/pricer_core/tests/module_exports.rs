//! Integration tests for module exports.
//!
//! Verify that public modules and types are reachable via absolute paths and
//! behave consistently across module boundaries.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

/// Contract and observation types are accessible via absolute path.
#[test]
fn test_types_module_exports() {
    use pricer_core::types::error::PricingError;
    use pricer_core::types::observation::{MarketObservation, PriceQuotation};
    use pricer_core::types::option::{Expiry, OptionContract, OptionType};

    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let contract = OptionContract::expiring_at(60_000.0, now + Duration::days(30), OptionType::Call);
    assert!(matches!(contract.expiry, Expiry::At(_)));

    let obs = MarketObservation::new("BTC-31MAR24-60000-C", "BTC", contract, 62_000.0, 0.045)
        .with_market_price(0.065)
        .with_quotation(PriceQuotation::Underlying)
        .with_valuation_time(now);
    assert!(obs.validate().is_ok());
    assert!((obs.time_to_expiry().unwrap() - 30.0 / 365.0).abs() < 1e-12);

    let missing_time = MarketObservation { valuation_time: None, ..obs };
    assert!(matches!(missing_time.validate(), Err(PricingError::InvalidInput(_))));
}

/// Quadrature and solvers are accessible via absolute path.
#[test]
fn test_math_module_exports() {
    use pricer_core::math::quadrature::{GaussKronrod, QuadratureConfig};
    use pricer_core::math::solvers::{LMConfig, LevenbergMarquardtSolver, NelderMeadConfig, NelderMeadSolver};

    let integral = GaussKronrod::new(QuadratureConfig::default())
        .integrate(|x| (-x * x).exp(), 0.0, 10.0)
        .unwrap();
    assert!((integral.value - 0.5 * std::f64::consts::PI.sqrt()).abs() < 1e-10);

    let lm = LevenbergMarquardtSolver::new(LMConfig::default())
        .solve(|p: &[f64]| vec![p[0] * p[0] - 4.0], vec![1.0])
        .unwrap();
    assert!((lm.params[0] - 2.0).abs() < 1e-8);

    let nm = NelderMeadSolver::new(NelderMeadConfig::default())
        .minimize(|p: &[f64]| (p[0] * p[0] - 4.0).abs(), vec![1.0])
        .unwrap();
    assert!((nm.params[0] - 2.0).abs() < 1e-4);
}

proptest! {
    /// Absolute expiries convert with ACT/365 on elapsed seconds.
    #[test]
    fn prop_act365_conversion(seconds in 1i64..(5 * 365 * 86_400)) {
        use pricer_core::types::{OptionContract, OptionType, SECONDS_PER_YEAR};

        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let contract = OptionContract::expiring_at(1.0, now + Duration::seconds(seconds), OptionType::Put);
        let t = contract.time_to_expiry(Some(now)).unwrap();
        prop_assert!((t - seconds as f64 / SECONDS_PER_YEAR).abs() < 1e-12);
    }

    /// The default filter never accepts an observation that fails validation.
    #[test]
    fn prop_filter_rejects_invalid(strike in -100.0f64..100.0, spot in -100.0f64..100.0) {
        use pricer_core::types::{MarketObservation, ObservationFilter, OptionContract, OptionType};

        let obs = MarketObservation::new(
            "X",
            "BTC",
            OptionContract::new(strike, 0.5, OptionType::Call),
            spot,
            0.0,
        )
        .with_market_price(1.0);
        if obs.validate().is_err() {
            prop_assert!(!ObservationFilter::default().accepts(&obs));
        }
    }
}
