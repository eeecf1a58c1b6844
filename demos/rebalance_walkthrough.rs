// ============================================================================
// Rebalance Walkthrough
// ============================================================================
//
// A fund of 1 share holding 100_000 USDC moves to 50% DAI / 50% USDT.
// Run with `RUST_LOG=debug` to see every trace event.

use basket_rebalance::logging::init_tracing;
use basket_rebalance::prelude::*;
use rust_decimal::Decimal;

fn pow10(n: u32) -> U256 {
    U256::new(10).pow(n)
}

fn main() -> Result<(), RebalanceError> {
    init_tracing();

    println!("=== Basket Rebalance Example ===\n");

    let engine = RebalanceEngineBuilder::new().with_logging().build()?;

    let half = D18::from_raw(pow10(17) * U256::new(5));
    let target = vec![D18::ZERO, half, half];
    let decimals = vec![6, 18, 6];
    let initial_assets = vec![pow10(11), U256::ZERO, U256::ZERO];

    // Start the rebalance
    let start = engine.start_rebalance(&StartRebalanceInputs {
        supply: D18::ONE,
        tokens: vec!["USDC".to_string(), "DAI".to_string(), "USDT".to_string()],
        balances: initial_assets.clone(),
        decimals: decimals.clone(),
        target_basket: target.clone(),
        prices: vec![Decimal::ONE; 3],
        price_errors: vec![Decimal::new(1, 1); 3],
        max_auction_sizes_usd: vec![Decimal::from(1_000_000); 3],
        weight_control: WeightControl::Tracking,
        defer_weights: false,
    })?;

    println!("Limits: {:?}", start.limits);
    for token in &start.tokens {
        println!(
            "  {}: weight [{}, {}, {}], price [{}, {}]",
            token.token,
            token.weight.low,
            token.weight.spot,
            token.weight.high,
            token.price.low,
            token.price.high
        );
    }

    // The ledger stores the record; read it back in its v5 shape
    let call = StartRebalanceCall::for_version(ProtocolVersion::V5, &start, 1_800, 604_800);
    let StartRebalanceCall::V5(call) = call else {
        return Err(RebalanceError::InvalidInput("expected a v5 call".to_string()));
    };
    let mut state = OnchainRebalance::V5(RebalanceV5 {
        nonce: 1,
        tokens: call.tokens,
        limits: call.limits,
        timestamps: RebalanceTimestamps {
            started_at: 1_700_000_000,
            restricted_until: 1_700_001_800,
            available_until: 1_700_604_800,
        },
        price_control: 1,
    })
    .into_state()?;

    // Three auctions: untouched, halfway, converged
    let balances = [
        initial_assets.clone(),
        vec![pow10(10) * U256::new(5), pow10(21) * U256::new(25), pow10(9) * U256::new(25)],
        vec![U256::ZERO, pow10(22) * U256::new(5), pow10(10) * U256::new(5)],
    ];

    for (round, current_assets) in balances.into_iter().enumerate() {
        println!("\n=== Auction {} ===", round + 1);

        let (args, metrics) = engine.open_auction(
            &state,
            &AuctionInputs {
                supply: D18::ONE,
                initial_supply: D18::ONE,
                initial_assets: initial_assets.clone(),
                target_basket: target.clone(),
                current_assets,
                decimals: decimals.clone(),
                prices: vec![Decimal::ONE; 3],
                price_errors: vec![Decimal::new(1, 2); 3],
                final_stage_at: Decimal::new(9, 1),
            },
        )?;

        println!("Round: {}", metrics.round);
        println!(
            "Progression: initial {} / absolute {} / relative {}",
            metrics.initial_progression,
            metrics.absolute_progression,
            metrics.relative_progression
        );
        println!(
            "Target: {} (relative {})",
            metrics.target, metrics.relative_target
        );
        println!("Auction size: ${}", metrics.auction_size);
        for size in &metrics.surplus_tokens {
            println!("  sell {}: ${}", size.token, size.usd);
        }
        for size in &metrics.deficit_tokens {
            println!("  buy {}: ${}", size.token, size.usd);
        }

        if args.is_empty() {
            println!("Nothing left to trade");
            continue;
        }

        // The ledger narrows its record to the opened auction's bounds
        state.limits = args.new_limits;
        for (i, token) in args.tokens.iter().enumerate() {
            if let Some(param) = state.tokens.iter_mut().find(|t| &t.token == token) {
                param.weight = args.new_weights[i];
                param.price = args.new_prices[i];
            }
        }
    }

    Ok(())
}
