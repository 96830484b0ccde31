//! Criterion benchmarks for pricer_pricing.
//!
//! Single Heston prices across maturities and a 200-instrument smile priced
//! sequentially and with Rayon.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pricer_core::types::{MarketObservation, OptionContract, OptionType};
use pricer_models::models::HestonParams;
use pricer_pricing::{price_batch_heston, HestonPricer, ParallelConfig};

fn btc_observation(strike: f64, t: f64) -> MarketObservation {
    MarketObservation::new(
        format!("BTC-{}-{}", strike, t),
        "BTC",
        OptionContract::new(strike, t, OptionType::Call),
        50_000.0,
        0.045,
    )
}

fn bench_single_price(c: &mut Criterion) {
    let mut group = c.benchmark_group("heston_price");
    let pricer = HestonPricer::default();
    let params = HestonParams::new(0.36, 0.4, 2.5, 1.2, -0.3).unwrap();

    for days in [7.0, 90.0, 365.0] {
        let obs = btc_observation(52_000.0, days / 365.0);
        group.bench_with_input(BenchmarkId::new("days", days), &obs, |b, obs| {
            b.iter(|| pricer.price_observation(black_box(obs), black_box(&params)));
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("heston_batch");
    group.sample_size(20);

    let pricer = HestonPricer::default();
    let params = HestonParams::new(0.36, 0.4, 2.5, 1.2, -0.3).unwrap();
    let observations: Vec<_> = (0..200)
        .map(|i| btc_observation(30_000.0 + 200.0 * i as f64, 0.1 + 0.005 * i as f64))
        .collect();

    group.bench_function("sequential_200", |b| {
        b.iter(|| price_batch_heston(&pricer, &observations, &params, &ParallelConfig::sequential()));
    });
    group.bench_function("parallel_200", |b| {
        b.iter(|| price_batch_heston(&pricer, &observations, &params, &ParallelConfig::default()));
    });

    group.finish();
}

criterion_group!(benches, bench_single_price, bench_batch);
criterion_main!(benches);
