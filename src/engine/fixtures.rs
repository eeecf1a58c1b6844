//! Shared test baskets: a USDC/DAI/USDT fund moving from all-USDC to 50/50 DAI/USDT,
//! and a DAI/USDT fund moving from all-DAI to 50/50.

use super::open_auction::AuctionInputs;
use super::start_rebalance::{initialize_rebalance, StartRebalanceInputs};
use crate::domain::{PriceControl, RebalanceState, StartPolicy, WeightControl};
use crate::interfaces::NoOpTraceHandler;
use crate::numeric::{D18, U256};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

pub fn pow10(n: u32) -> U256 {
    U256::new(10).pow(n)
}

pub fn stable_tokens() -> Vec<String> {
    vec!["USDC".to_string(), "DAI".to_string(), "USDT".to_string()]
}

pub fn stable_decimals() -> Vec<u8> {
    vec![6, 18, 6]
}

/// 100_000 USDC held by 1 share
pub fn all_usdc_balances() -> Vec<U256> {
    vec![pow10(11), U256::ZERO, U256::ZERO]
}

/// 0% USDC, 50% DAI, 50% USDT
pub fn half_dai_half_usdt() -> Vec<D18> {
    let half = D18::from_raw(pow10(17) * U256::new(5));
    vec![D18::ZERO, half, half]
}

pub fn stable_basket_inputs(weight_control: WeightControl) -> StartRebalanceInputs {
    StartRebalanceInputs {
        supply: D18::ONE,
        tokens: stable_tokens(),
        balances: all_usdc_balances(),
        decimals: stable_decimals(),
        target_basket: half_dai_half_usdt(),
        prices: vec![Decimal::ONE; 3],
        price_errors: vec![Decimal::new(1, 1); 3],
        max_auction_sizes_usd: vec![Decimal::from(1_000_000); 3],
        weight_control,
        defer_weights: false,
    }
}

pub fn started_at() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

/// On-chain record created from initializing `inputs`.
pub fn rebalance_state(
    inputs: &StartRebalanceInputs,
    price_control: PriceControl,
) -> RebalanceState {
    let output = initialize_rebalance(inputs, &StartPolicy::default(), &NoOpTraceHandler).unwrap();

    RebalanceState {
        nonce: 1,
        tokens: output.tokens,
        limits: output.limits,
        started_at: started_at(),
        restricted_until: started_at() + Duration::minutes(30),
        available_until: started_at() + Duration::days(7),
        price_control,
    }
}

/// On-chain record created from the TRACKING initialization of the stable basket.
pub fn stable_rebalance_state(price_control: PriceControl) -> RebalanceState {
    rebalance_state(&stable_basket_inputs(WeightControl::Tracking), price_control)
}

/// Auction inputs for the stable basket at `current_assets`, $1 prices and 1% error.
pub fn stable_auction_inputs(current_assets: Vec<U256>) -> AuctionInputs {
    AuctionInputs {
        supply: D18::ONE,
        initial_supply: D18::ONE,
        initial_assets: all_usdc_balances(),
        target_basket: half_dai_half_usdt(),
        current_assets,
        decimals: stable_decimals(),
        prices: vec![Decimal::ONE; 3],
        price_errors: vec![Decimal::new(1, 2); 3],
        final_stage_at: Decimal::new(9, 1),
    }
}

/// 100_000 DAI held by 1 share
pub fn all_dai_balances() -> Vec<U256> {
    vec![pow10(23), U256::ZERO]
}

/// DAI/USDT basket moving from all-DAI to 50/50, $1 prices and 10% error.
pub fn dai_usdt_basket_inputs(weight_control: WeightControl) -> StartRebalanceInputs {
    let half = D18::from_raw(pow10(17) * U256::new(5));
    StartRebalanceInputs {
        supply: D18::ONE,
        tokens: vec!["DAI".to_string(), "USDT".to_string()],
        balances: all_dai_balances(),
        decimals: vec![18, 6],
        target_basket: vec![half, half],
        prices: vec![Decimal::ONE; 2],
        price_errors: vec![Decimal::new(1, 1); 2],
        max_auction_sizes_usd: vec![Decimal::from(1_000_000); 2],
        weight_control,
        defer_weights: false,
    }
}

/// Auction inputs for the DAI/USDT basket at `current_assets`, $1 prices and 1% error.
pub fn dai_usdt_auction_inputs(current_assets: Vec<U256>) -> AuctionInputs {
    let basket = dai_usdt_basket_inputs(WeightControl::Tracking);
    AuctionInputs {
        supply: D18::ONE,
        initial_supply: D18::ONE,
        initial_assets: basket.balances,
        target_basket: basket.target_basket,
        current_assets,
        decimals: basket.decimals,
        prices: basket.prices,
        price_errors: vec![Decimal::new(1, 2); 2],
        final_stage_at: Decimal::new(9, 1),
    }
}
