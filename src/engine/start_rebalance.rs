// ============================================================================
// Rebalance Initialization
// Derives starting weight, price and limit bounds from a target basket
// ============================================================================

use crate::basket::validated_prices;
use crate::domain::{
    max_token_price, max_weight, PriceRange, RebalanceLimits, StartPolicy, TokenRebalanceParam,
    WeightControl, WeightRange,
};
use crate::error::{ensure_len, RebalanceError, RebalanceResult};
use crate::interfaces::{TraceEvent, TraceHandler};
use crate::numeric::precise::{self, exp10, from_decimal};
use crate::numeric::units::{price_to_d27, weight_from_whole, whole_tokens};
use crate::numeric::{NumericError, D18, D27, U256};
use bigdecimal::BigDecimal;
use num_traits::Zero;
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inputs for deriving a new rebalance. All vectors are parallel to `tokens`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StartRebalanceInputs {
    /// D18{share}
    pub supply: D18,
    pub tokens: Vec<String>,
    /// {tok}
    pub balances: Vec<U256>,
    pub decimals: Vec<u8>,
    /// D18{1} target share of value per token
    pub target_basket: Vec<D18>,
    /// {USD/wholeTok}
    pub prices: Vec<Decimal>,
    /// {1} tolerated price error per token, in [0, 1)
    pub price_errors: Vec<Decimal>,
    /// {USD} largest value a single auction may move per token
    pub max_auction_sizes_usd: Vec<Decimal>,
    pub weight_control: WeightControl,
    /// NATIVE only: open weights fully and let auctions set them
    pub defer_weights: bool,
}

/// Seed record for the ledger's rebalance-start call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StartRebalanceOutput {
    pub tokens: Vec<TokenRebalanceParam>,
    /// D18{BU/share}
    pub limits: RebalanceLimits,
}

/// Derive the starting bounds of a rebalance.
///
/// # Errors
/// Fails on malformed inputs (`LengthMismatch`, `InvalidInput`,
/// `InvalidPriceError`, `UnsupportedMode`, `MissingPrice`), on out-of-range
/// results (`InvalidWeights`, `InvalidPrices`, `ZeroAuctionSize`), when the
/// aggregate basket error is at least 1 (`BasketErrorTooLarge`), and when the
/// price-range ratio clamp exceeds its slack (`InternalInvariant`).
pub fn initialize_rebalance(
    inputs: &StartRebalanceInputs,
    policy: &StartPolicy,
    trace: &dyn TraceHandler,
) -> RebalanceResult<StartRebalanceOutput> {
    let n = inputs.tokens.len();
    if n == 0 {
        return Err(RebalanceError::InvalidInput("no tokens".to_string()));
    }
    ensure_len("balances", n, inputs.balances.len())?;
    ensure_len("decimals", n, inputs.decimals.len())?;
    ensure_len("target_basket", n, inputs.target_basket.len())?;
    ensure_len("prices", n, inputs.prices.len())?;
    ensure_len("price_errors", n, inputs.price_errors.len())?;
    ensure_len("max_auction_sizes_usd", n, inputs.max_auction_sizes_usd.len())?;

    if inputs.supply.is_zero() {
        return Err(RebalanceError::InvalidInput("supply must be positive".to_string()));
    }
    if inputs.defer_weights && inputs.weight_control == WeightControl::Tracking {
        return Err(RebalanceError::UnsupportedMode(
            "deferred weights require NATIVE weight control",
        ));
    }

    // {USD/wholeTok}
    let prices = validated_prices(&inputs.prices, Some(&inputs.tokens))?;
    // {1}
    let price_errors = validated_price_errors(&inputs.tokens, &inputs.price_errors, policy)?;
    // {1}
    let targets: Vec<BigDecimal> = inputs.target_basket.iter().map(|t| t.to_precise()).collect();

    // {1} = sum({1} * {1})
    let basket_error = precise::sum(targets.iter().zip(&price_errors).map(|(t, e)| t * e));
    if basket_error >= precise::one() {
        return Err(RebalanceError::BasketErrorTooLarge { basket_error });
    }

    // {wholeShare}
    let supply = inputs.supply.to_precise();

    // {USD/wholeShare} = {wholeTok} / {wholeShare} * {USD/wholeTok}
    let mut share_value = precise::zero();
    for (i, price) in prices.iter().enumerate() {
        let held = whole_tokens(inputs.balances[i], inputs.decimals[i]);
        share_value += precise::div(&held, &supply)? * price;
    }
    if share_value.is_zero() {
        return Err(RebalanceError::InvalidInput("basket holds no value".to_string()));
    }

    let tokens = (0..n)
        .map(|i| -> RebalanceResult<TokenRebalanceParam> {
            let token = inputs.tokens[i].as_str();
            let decimals = inputs.decimals[i];

            // {wholeTok/wholeBU} = {USD/wholeShare} * {1} / {USD/wholeTok}, with 1 BU per share
            let spot_weight = precise::div(&(&share_value * &targets[i]), &prices[i])?;

            Ok(TokenRebalanceParam {
                token: token.to_string(),
                weight: initial_weights(
                    token,
                    &spot_weight,
                    &price_errors[i],
                    decimals,
                    inputs.weight_control,
                    inputs.defer_weights,
                )?,
                price: initial_prices(token, &prices[i], &price_errors[i], decimals, policy, trace)?,
                max_auction_size: max_auction_size(
                    token,
                    inputs.max_auction_sizes_usd[i],
                    &prices[i],
                    decimals,
                    trace,
                )?,
                in_rebalance: true,
            })
        })
        .collect::<RebalanceResult<Vec<_>>>()?;

    let limits = match inputs.weight_control {
        WeightControl::Tracking => {
            let keep = precise::one() - &basket_error;
            RebalanceLimits::new(
                D18::from_precise(&keep)?,
                D18::ONE,
                D18::from_precise(&precise::div(&precise::one(), &keep)?)?,
            )
        }
        WeightControl::Native => RebalanceLimits::fixed(),
    };

    trace.on_event(TraceEvent::RebalanceInitialized {
        tokens: n,
        weight_control: inputs.weight_control,
        basket_error,
    });

    Ok(StartRebalanceOutput { tokens, limits })
}

/// Check each price error against `[0, 1)` and the policy ceiling.
fn validated_price_errors(
    tokens: &[String],
    price_errors: &[Decimal],
    policy: &StartPolicy,
) -> RebalanceResult<Vec<BigDecimal>> {
    tokens
        .iter()
        .zip(price_errors)
        .map(|(token, price_error)| {
            let above_ceiling = policy
                .max_price_error
                .is_some_and(|ceiling| *price_error > ceiling);

            if *price_error < Decimal::ZERO || *price_error >= Decimal::ONE || above_ceiling {
                return Err(RebalanceError::InvalidPriceError {
                    token: token.clone(),
                    price_error: *price_error,
                });
            }
            Ok(from_decimal(*price_error))
        })
        .collect()
}

fn invalid_weights(token: &str, reason: impl Into<String>) -> RebalanceError {
    RebalanceError::InvalidWeights {
        token: token.to_string(),
        reason: reason.into(),
    }
}

fn invalid_prices(token: &str, reason: impl Into<String>) -> RebalanceError {
    RebalanceError::InvalidPrices {
        token: token.to_string(),
        reason: reason.into(),
    }
}

/// D27{tok/BU} weight range around the ideal spot weight.
fn initial_weights(
    token: &str,
    spot_weight: &BigDecimal,
    price_error: &BigDecimal,
    decimals: u8,
    weight_control: WeightControl,
    defer_weights: bool,
) -> RebalanceResult<WeightRange> {
    let to_weight = |whole: &BigDecimal| {
        weight_from_whole(whole, decimals).map_err(|e| invalid_weights(token, e.to_string()))
    };

    let spot = to_weight(spot_weight)?;

    let range = match weight_control {
        WeightControl::Tracking => WeightRange::point(spot),
        // low stays at 1 unless spot is 0, so a griefed spot of 0 cannot pin the range
        WeightControl::Native if defer_weights => {
            WeightRange::new(spot.min(D27::from_raw_u128(1)), spot, max_weight())
        }
        WeightControl::Native => {
            let keep = precise::one() - price_error;
            WeightRange::new(
                to_weight(&(spot_weight * &keep))?,
                spot,
                to_weight(&precise::div(spot_weight, &keep)?)?,
            )
        }
    };

    if range.low > range.spot {
        return Err(invalid_weights(token, "low above spot"));
    }
    if range.spot > range.high {
        return Err(invalid_weights(token, "spot above high"));
    }
    if range.high > max_weight() {
        return Err(invalid_weights(token, "high above 1e54"));
    }

    Ok(range)
}

/// D27{nanoUSD/tok} price range, at most `max_price_ratio` wide.
fn initial_prices(
    token: &str,
    price: &BigDecimal,
    price_error: &BigDecimal,
    decimals: u8,
    policy: &StartPolicy,
    trace: &dyn TraceHandler,
) -> RebalanceResult<PriceRange> {
    let to_price = |usd: &BigDecimal| {
        price_to_d27(usd, decimals).map_err(|e| invalid_prices(token, e.to_string()))
    };

    let keep = precise::one() - price_error;
    let low = to_price(&(price * &keep))?;
    let high = to_price(&precise::div(price, &keep)?)?;

    if low.is_zero() {
        return Err(invalid_prices(token, "low price rounds to zero"));
    }
    if low > high {
        return Err(invalid_prices(token, "low above high"));
    }
    if high > max_token_price() {
        return Err(invalid_prices(token, "high above 1e45"));
    }

    // floor rounding on low can push high/low just past the ratio bound
    let ratio_cap = low
        .raw_value()
        .checked_mul(U256::from(policy.max_price_ratio))
        .ok_or(NumericError::Overflow)?;

    if high.raw_value() <= ratio_cap {
        return Ok(PriceRange::new(low, high));
    }

    let adjustment = high.raw_value() - ratio_cap;
    if adjustment > U256::from(policy.price_ratio_slack) {
        return Err(RebalanceError::InternalInvariant(format!(
            "price range for {} exceeds {}x by {} units",
            token, policy.max_price_ratio, adjustment
        )));
    }

    trace.on_event(TraceEvent::PriceRangeClamped {
        token: token.to_string(),
        original_high: high.raw_value(),
        clamped_high: ratio_cap,
    });

    Ok(PriceRange::new(low, D27::from_raw(ratio_cap)))
}

/// {tok} = {USD} / {USD/wholeTok} * {tok/wholeTok}, saturating at the 256-bit maximum.
fn max_auction_size(
    token: &str,
    usd_cap: Decimal,
    price: &BigDecimal,
    decimals: u8,
    trace: &dyn TraceHandler,
) -> RebalanceResult<U256> {
    if usd_cap < Decimal::ZERO {
        return Err(RebalanceError::InvalidInput(format!(
            "negative max auction size for {}",
            token
        )));
    }

    let amount = precise::div(&from_decimal(usd_cap), price)? * exp10(decimals as i64);

    match precise::to_scaled_int(&amount) {
        Ok(size) if size == U256::ZERO => Err(RebalanceError::ZeroAuctionSize {
            token: token.to_string(),
        }),
        Ok(size) => Ok(size),
        Err(NumericError::Overflow) => {
            trace.on_event(TraceEvent::AuctionSizeSaturated {
                token: token.to_string(),
            });
            Ok(U256::MAX)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::{pow10, stable_basket_inputs};
    use crate::interfaces::{NoOpTraceHandler, RecordingTraceHandler};
    use proptest::prelude::*;

    fn init(inputs: &StartRebalanceInputs) -> RebalanceResult<StartRebalanceOutput> {
        initialize_rebalance(inputs, &StartPolicy::default(), &NoOpTraceHandler)
    }

    #[test]
    fn test_tracking_weights_are_points() {
        let output = init(&stable_basket_inputs(WeightControl::Tracking)).unwrap();

        let usdc = &output.tokens[0];
        assert_eq!(usdc.weight, WeightRange::point(D27::ZERO));

        // 50_000 DAI per BU (18 decimals) and 50_000 USDT per BU (6 decimals)
        let dai = &output.tokens[1];
        assert_eq!(dai.weight, WeightRange::point(D27::from_raw(pow10(31) * U256::new(5))));
        let usdt = &output.tokens[2];
        assert_eq!(usdt.weight, WeightRange::point(D27::from_raw(pow10(19) * U256::new(5))));

        assert!(output.tokens.iter().all(|t| t.in_rebalance));
    }

    #[test]
    fn test_tracking_limits_follow_basket_error() {
        let output = init(&stable_basket_inputs(WeightControl::Tracking)).unwrap();

        // basket error = 0.5 * 0.1 + 0.5 * 0.1 = 0.1
        assert_eq!(output.limits.low.raw_value(), U256::new(900_000_000_000_000_000));
        assert_eq!(output.limits.spot, D18::ONE);
        assert_eq!(
            output.limits.high.raw_value(),
            U256::new(1_111_111_111_111_111_111)
        );
    }

    #[test]
    fn test_native_weights_widen_with_price_error() {
        let output = init(&stable_basket_inputs(WeightControl::Native)).unwrap();

        let dai = &output.tokens[1].weight;
        assert_eq!(dai.spot.raw_value(), pow10(31) * U256::new(5));
        assert_eq!(dai.low.raw_value(), pow10(30) * U256::new(45));
        assert!(dai.high > dai.spot);
        assert!(dai.is_valid());
        assert_eq!(output.limits, RebalanceLimits::fixed());
    }

    #[test]
    fn test_price_ranges() {
        let output = init(&stable_basket_inputs(WeightControl::Tracking)).unwrap();

        // $1 USDC: 1e30 D27{nanoUSD/tok}; low = 0.9e30
        let usdc = &output.tokens[0].price;
        assert_eq!(usdc.low.raw_value(), pow10(29) * U256::new(9));
        assert!(usdc.contains(D27::from_raw(pow10(30))));
        assert!(usdc.high.raw_value() > pow10(30));
    }

    #[test]
    fn test_max_auction_size() {
        let output = init(&stable_basket_inputs(WeightControl::Tracking)).unwrap();
        // $1M of USDC at $1
        assert_eq!(output.tokens[0].max_auction_size, pow10(12));
        // $1M of DAI at $1
        assert_eq!(output.tokens[1].max_auction_size, pow10(24));
    }

    #[test]
    fn test_defer_weights_native() {
        let mut inputs = stable_basket_inputs(WeightControl::Native);
        inputs.defer_weights = true;
        let output = init(&inputs).unwrap();

        assert_eq!(output.tokens[0].weight.low, D27::ZERO);
        assert_eq!(output.tokens[1].weight.low, D27::from_raw_u128(1));
        assert!(output.tokens.iter().all(|t| t.weight.high == max_weight()));
    }

    #[test]
    fn test_defer_weights_tracking_unsupported() {
        let mut inputs = stable_basket_inputs(WeightControl::Tracking);
        inputs.defer_weights = true;
        assert!(matches!(init(&inputs), Err(RebalanceError::UnsupportedMode(_))));
    }

    #[test]
    fn test_basket_error_too_large() {
        let mut inputs = stable_basket_inputs(WeightControl::Tracking);
        // malformed target summing to 2 with 0.5 price errors
        inputs.target_basket = vec![D18::ONE, D18::ONE, D18::ZERO];
        inputs.price_errors = vec![Decimal::new(5, 1); 3];

        let err = init(&inputs).unwrap_err();
        assert!(matches!(err, RebalanceError::BasketErrorTooLarge { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::BasketErrorTooLarge);
    }

    #[test]
    fn test_price_error_bounds() {
        let mut inputs = stable_basket_inputs(WeightControl::Tracking);
        inputs.price_errors[1] = Decimal::ONE;
        assert!(matches!(
            init(&inputs),
            Err(RebalanceError::InvalidPriceError { .. })
        ));

        // above the 0.9 policy ceiling
        inputs.price_errors[1] = Decimal::new(95, 2);
        assert!(matches!(
            init(&inputs),
            Err(RebalanceError::InvalidPriceError { .. })
        ));

        // without a ceiling, 0.95 gives a 400x price range
        let uncapped = StartPolicy {
            max_price_error: None,
            ..StartPolicy::default()
        };
        assert!(matches!(
            initialize_rebalance(&inputs, &uncapped, &NoOpTraceHandler),
            Err(RebalanceError::InternalInvariant(_))
        ));
    }

    #[test]
    fn test_price_ratio_clamped_within_slack() {
        let inputs = StartRebalanceInputs {
            supply: D18::ONE,
            tokens: vec!["WIDE".to_string()],
            balances: vec![pow10(27)],
            decimals: vec![27],
            target_basket: vec![D18::ONE],
            prices: vec![Decimal::new(12_345_678_901_234_567, 17)],
            price_errors: vec![Decimal::new(9, 1)],
            max_auction_sizes_usd: vec![Decimal::from(1_000)],
            weight_control: WeightControl::Native,
            defer_weights: false,
        };
        let trace = RecordingTraceHandler::new();
        let output = initialize_rebalance(&inputs, &StartPolicy::default(), &trace).unwrap();

        // low = floor(0.012345678901234567e9), high clamped to exactly 100x low
        let price = output.tokens[0].price;
        assert_eq!(price.low.raw_value(), U256::new(12_345_678));
        assert_eq!(price.high.raw_value(), U256::new(1_234_567_800));
        assert!(trace
            .events()
            .iter()
            .any(|e| matches!(e, TraceEvent::PriceRangeClamped { .. })));
    }

    #[test]
    fn test_zero_auction_size() {
        let mut inputs = stable_basket_inputs(WeightControl::Tracking);
        inputs.max_auction_sizes_usd[2] = Decimal::ZERO;
        assert_eq!(
            init(&inputs),
            Err(RebalanceError::ZeroAuctionSize {
                token: "USDT".to_string()
            })
        );
    }

    #[test]
    fn test_input_validation() {
        let mut inputs = stable_basket_inputs(WeightControl::Tracking);
        inputs.prices.pop();
        assert!(matches!(
            init(&inputs),
            Err(RebalanceError::LengthMismatch { field: "prices", .. })
        ));

        let mut inputs = stable_basket_inputs(WeightControl::Tracking);
        inputs.prices[1] = Decimal::ZERO;
        assert_eq!(
            init(&inputs),
            Err(RebalanceError::MissingPrice {
                token: "DAI".to_string()
            })
        );

        let mut inputs = stable_basket_inputs(WeightControl::Tracking);
        inputs.balances = vec![U256::ZERO; 3];
        assert!(matches!(init(&inputs), Err(RebalanceError::InvalidInput(_))));
    }

    #[test]
    fn test_initialized_event() {
        let trace = RecordingTraceHandler::new();
        initialize_rebalance(
            &stable_basket_inputs(WeightControl::Tracking),
            &StartPolicy::default(),
            &trace,
        )
        .unwrap();

        assert!(trace.events().iter().any(|e| matches!(
            e,
            TraceEvent::RebalanceInitialized {
                tokens: 3,
                weight_control: WeightControl::Tracking,
                ..
            }
        )));
    }

    proptest! {
        #[test]
        fn prop_initial_ranges_are_ordered(
            dai_share in 1u64..1_000u64,
            error_bps in 0u32..9_000u32,
            dai_price_cents in 50i64..200i64,
            native in any::<bool>(),
        ) {
            let mut inputs = stable_basket_inputs(if native {
                WeightControl::Native
            } else {
                WeightControl::Tracking
            });
            let dai = D18::from_raw(pow10(15) * U256::from(dai_share));
            inputs.target_basket = vec![
                D18::ZERO,
                dai,
                D18::from_raw(pow10(18) - dai.raw_value()),
            ];
            inputs.price_errors = vec![Decimal::new(error_bps as i64, 4); 3];
            inputs.prices[1] = Decimal::new(dai_price_cents, 2);

            let output = init(&inputs).unwrap();
            prop_assert!(output.limits.is_valid());
            for token in &output.tokens {
                prop_assert!(token.weight.is_valid());
                prop_assert!(token.price.is_valid());
            }
        }
    }
}
