// ============================================================================
// Rebalance Engine Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Initialization - Deriving the seed record from a target basket
// 2. Auction Round - Computing the next auction over growing token counts
// 3. Basket Metrics - Distribution and accuracy scoring
//
// Every basket moves value from its first half of tokens into its second
// half, alternating 6- and 18-decimal tokens.
// ============================================================================

use basket_rebalance::prelude::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use std::hint::black_box;

const TOKEN_COUNTS: [usize; 4] = [3, 10, 50, 100];

struct Basket {
    start: StartRebalanceInputs,
    auction: AuctionInputs,
}

fn decimals_of(i: usize) -> u8 {
    if i % 2 == 0 {
        6
    } else {
        18
    }
}

fn synthetic_basket(n: usize) -> Basket {
    let sellers = n / 2;
    let buyers = (n - sellers) as u128;
    let share = D18::from_raw_u128(1_000_000_000_000_000_000 / buyers);

    let tokens: Vec<String> = (0..n).map(|i| format!("TKN{}", i)).collect();
    let decimals: Vec<u8> = (0..n).map(decimals_of).collect();
    let balances: Vec<U256> = (0..n)
        .map(|i| {
            if i < sellers {
                U256::new(1_000) * U256::new(10).pow(decimals_of(i) as u32)
            } else {
                U256::ZERO
            }
        })
        .collect();
    let target_basket: Vec<D18> = (0..n)
        .map(|i| if i < sellers { D18::ZERO } else { share })
        .collect();
    let prices: Vec<Decimal> = (0..n).map(|i| Decimal::new(100 + (i % 7) as i64, 2)).collect();

    Basket {
        start: StartRebalanceInputs {
            supply: D18::ONE,
            tokens,
            balances: balances.clone(),
            decimals: decimals.clone(),
            target_basket: target_basket.clone(),
            prices: prices.clone(),
            price_errors: vec![Decimal::new(1, 1); n],
            max_auction_sizes_usd: vec![Decimal::from(1_000_000); n],
            weight_control: WeightControl::Tracking,
            defer_weights: false,
        },
        auction: AuctionInputs {
            supply: D18::ONE,
            initial_supply: D18::ONE,
            initial_assets: balances.clone(),
            target_basket,
            current_assets: balances,
            decimals,
            prices,
            price_errors: vec![Decimal::new(1, 2); n],
            final_stage_at: Decimal::new(9, 1),
        },
    }
}

fn rebalance_state(engine: &RebalanceEngine, basket: &Basket) -> RebalanceState {
    let start = engine.start_rebalance(&basket.start).unwrap();
    OnchainRebalance::V5(RebalanceV5 {
        nonce: 1,
        tokens: start.tokens.iter().map(TokenParamsV5::from).collect(),
        limits: start.limits,
        timestamps: RebalanceTimestamps::default(),
        price_control: 1,
    })
    .into_state()
    .unwrap()
}

// ============================================================================
// Initialization Benchmarks
// ============================================================================

fn benchmark_start_rebalance(c: &mut Criterion) {
    let mut group = c.benchmark_group("start_rebalance");
    let engine = RebalanceEngineBuilder::new().build().unwrap();

    for num_tokens in TOKEN_COUNTS.iter() {
        let basket = synthetic_basket(*num_tokens);
        group.bench_with_input(
            BenchmarkId::from_parameter(num_tokens),
            &basket,
            |b, basket| {
                b.iter(|| black_box(engine.start_rebalance(&basket.start)));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Auction Round Benchmarks
// ============================================================================

fn benchmark_open_auction(c: &mut Criterion) {
    let mut group = c.benchmark_group("open_auction");
    let engine = RebalanceEngineBuilder::new().build().unwrap();

    for num_tokens in TOKEN_COUNTS.iter() {
        let basket = synthetic_basket(*num_tokens);
        let state = rebalance_state(&engine, &basket);

        group.bench_with_input(
            BenchmarkId::from_parameter(num_tokens),
            &(state, basket),
            |b, (state, basket)| {
                b.iter(|| black_box(engine.open_auction(state, &basket.auction)));
            },
        );
    }

    group.finish();
}

fn benchmark_open_auction_recording(c: &mut Criterion) {
    let engine = RebalanceEngineBuilder::new()
        .trace_handler(std::sync::Arc::new(RecordingTraceHandler::new()))
        .build()
        .unwrap();
    let basket = synthetic_basket(10);
    let state = rebalance_state(&engine, &basket);

    c.bench_function("open_auction_recording_trace", |b| {
        b.iter(|| black_box(engine.open_auction(&state, &basket.auction)));
    });
}

// ============================================================================
// Basket Metrics Benchmarks
// ============================================================================

fn benchmark_basket_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("basket_metrics");
    let engine = RebalanceEngineBuilder::new().build().unwrap();

    for num_tokens in TOKEN_COUNTS.iter() {
        let basket = synthetic_basket(*num_tokens);
        let state = rebalance_state(&engine, &basket);
        let weights: Vec<WeightRange> = state.tokens.iter().map(|t| t.weight).collect();
        let inputs = &basket.auction;

        group.bench_with_input(
            BenchmarkId::new("distribution", num_tokens),
            inputs,
            |b, inputs| {
                b.iter(|| {
                    black_box(basket_distribution(
                        &inputs.current_assets,
                        &inputs.prices,
                        &inputs.decimals,
                    ))
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("accuracy", num_tokens),
            inputs,
            |b, inputs| {
                b.iter(|| {
                    black_box(basket_accuracy(
                        inputs.supply,
                        &inputs.current_assets,
                        &inputs.prices,
                        &inputs.decimals,
                        &weights,
                        &state.limits,
                    ))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_start_rebalance,
    benchmark_open_auction,
    benchmark_open_auction_recording,
    benchmark_basket_metrics,
);
criterion_main!(benches);
