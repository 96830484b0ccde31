//! Benchmarks for pricer_optimiser.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pricer_core::types::{MarketObservation, OptionContract, OptionType};
use pricer_models::models::HestonParams;
use pricer_optimiser::calibration::{HestonCalibrator, HestonCalibratorConfig, Optimiser};
use pricer_pricing::HestonPricer;

/// Call smile on a 3 x 5 expiry/strike grid priced from known parameters.
fn synthetic_smile() -> Vec<MarketObservation> {
    let truth = HestonParams::new(0.04, 0.04, 2.0, 0.3, -0.5).unwrap();
    let pricer = HestonPricer::default();
    [0.25, 0.5, 1.0]
        .iter()
        .flat_map(|&t| [80.0, 90.0, 100.0, 110.0, 120.0].map(move |k| (t, k)))
        .map(|(t, k)| {
            let obs = MarketObservation::new(
                format!("SYN-{}-{}", t, k),
                "SYN",
                OptionContract::new(k, t, OptionType::Call),
                100.0,
                0.02,
            );
            let price = pricer.price_observation(&obs, &truth).price;
            obs.with_market_price(price)
        })
        .collect()
}

fn benchmark_calibration(c: &mut Criterion) {
    let observations = synthetic_smile();
    let guess = HestonParams::new(0.06, 0.05, 1.5, 0.5, -0.3).unwrap();

    let mut group = c.benchmark_group("heston_calibration");
    group.sample_size(10);

    let lm = HestonCalibrator::new(HestonCalibratorConfig::default().with_max_restarts(0));
    group.bench_function("levenberg_marquardt", |b| {
        b.iter(|| lm.calibrate(black_box(&observations), guess))
    });

    let nm = HestonCalibrator::new(
        HestonCalibratorConfig::default()
            .with_optimiser(Optimiser::NelderMead)
            .with_max_restarts(0),
    );
    group.bench_function("nelder_mead", |b| {
        b.iter(|| nm.calibrate(black_box(&observations), guess))
    });

    group.finish();
}

fn benchmark_objective(c: &mut Criterion) {
    let observations = synthetic_smile();
    let calibrator = HestonCalibrator::default();
    let params = HestonParams::default();

    c.bench_function("heston_objective_15", |b| {
        b.iter(|| calibrator.objective(black_box(&observations), black_box(&params)))
    });
}

criterion_group!(benches, benchmark_calibration, benchmark_objective);
criterion_main!(benches);
