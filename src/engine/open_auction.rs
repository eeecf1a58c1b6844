// ============================================================================
// Auction Round Engine
// Next auction's weights, prices and limits from an in-progress rebalance
// ============================================================================

use super::progression::{
    classify_round, progression_of, refine_target, relative_to_initial, Holding, Progression,
};
use crate::basket::validated_prices;
use crate::domain::{
    AuctionMetrics, AuctionPolicy, AuctionRound, OpenAuctionArgs, PriceControl, PriceRange,
    RebalanceLimits, RebalanceState, TokenRebalanceParam, TokenSize, TradeSide, WeightRange,
};
use crate::error::{ensure_len, RebalanceError, RebalanceResult};
use crate::interfaces::{TraceEvent, TraceHandler};
use crate::numeric::precise::{self, from_decimal, to_decimal};
use crate::numeric::units::{
    price_to_d27, token_amount, usd_value, weight_from_whole, weight_to_whole, whole_tokens,
};
use crate::numeric::{NumericError, D18, U256};
use bigdecimal::BigDecimal;
use num_traits::Zero;
use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Market and balance inputs for one auction round.
///
/// Per-token vectors are parallel to the rebalance state's tokens.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuctionInputs {
    /// D18{share} current supply
    pub supply: D18,
    /// D18{share} supply when the rebalance started
    pub initial_supply: D18,
    /// {tok} balances when the rebalance started
    pub initial_assets: Vec<U256>,
    /// D18{1}
    pub target_basket: Vec<D18>,
    /// {tok}
    pub current_assets: Vec<U256>,
    pub decimals: Vec<u8>,
    /// {USD/wholeTok}
    pub prices: Vec<Decimal>,
    /// {1} in [0, 1)
    pub price_errors: Vec<Decimal>,
    /// {1} relative progression at which PROGRESS rounds hand over to FINAL
    pub final_stage_at: Decimal,
}

/// One token normalized to whole units per whole share.
struct TokenView<'a> {
    param: &'a TokenRebalanceParam,
    decimals: u8,
    /// {tok}
    assets: U256,
    /// {USD/wholeTok}
    price: BigDecimal,
    /// {1}
    price_error: BigDecimal,
    /// {1}
    target: BigDecimal,
    /// {wholeTok/wholeShare}
    held: BigDecimal,
    /// {wholeTok/wholeShare}
    initial_held: BigDecimal,
    /// {wholeTok/wholeBU}
    spot_weight: BigDecimal,
}

/// Basket valuation over the tokens in the rebalance.
struct Valuation {
    /// {USD/wholeShare}
    share_value: BigDecimal,
    /// {USD/wholeShare} at the initial balances and current prices
    initial_share_value: BigDecimal,
    /// {USD/wholeBU}
    bu_value: BigDecimal,
    /// {wholeBU/wholeShare}, never below the on-chain spot limit
    spot_limit: BigDecimal,
    /// {1}
    portion_being_ejected: BigDecimal,
}

/// Compute the next auction's parameters and progress metrics.
///
/// A pure function of its inputs; the only side effect is trace events.
///
/// # Errors
/// - `PriceOutOfBounds` when a market price left the initial price range;
///   the rebalance must be closed
/// - `ValueDivergence`, `InvalidTarget` on inconsistent inputs
/// - `DegeneratePriceRange` when a clamped price range collapses
/// - input validation errors for malformed vectors, prices or `finalStageAt`
pub fn compute_next_auction(
    state: &RebalanceState,
    inputs: &AuctionInputs,
    policy: &AuctionPolicy,
    trace: &dyn TraceHandler,
) -> RebalanceResult<(OpenAuctionArgs, AuctionMetrics)> {
    let views = token_views(state, inputs)?;
    let in_rebalance: Vec<&TokenView> = views.iter().filter(|v| v.param.in_rebalance).collect();

    check_price_bounds(&in_rebalance)?;

    let valuation = value_basket(&in_rebalance, &state.limits, policy)?;
    trace.on_event(TraceEvent::ValuesComputed {
        share_value: valuation.share_value.clone(),
        bu_value: valuation.bu_value.clone(),
        spot_limit: valuation.spot_limit.clone(),
        portion_being_ejected: valuation.portion_being_ejected.clone(),
    });

    let progression = measure_progression(&in_rebalance, &valuation, trace)?;

    let plan = classify_round(
        &progression,
        &valuation.portion_being_ejected,
        &from_decimal(inputs.final_stage_at),
        policy,
    )?;
    trace.on_event(TraceEvent::RoundClassified {
        round: plan.round,
        target: plan.target.clone(),
    });

    let eject = plan.round == AuctionRound::Eject;
    let delta = precise::one() - &plan.target;

    let new_limits = next_limits(&valuation.spot_limit, &delta, &state.limits, eject)?;
    trace.on_event(TraceEvent::LimitsComputed { limits: new_limits });

    let min_trade_usd = from_decimal(policy.min_trade_usd);
    let mut args = OpenAuctionArgs {
        rebalance_nonce: state.nonce,
        tokens: Vec::new(),
        new_weights: Vec::new(),
        new_prices: Vec::new(),
        new_limits,
    };
    let mut surplus_tokens = Vec::new();
    let mut deficit_tokens = Vec::new();
    let mut surplus_total = precise::zero();
    let mut deficit_total = precise::zero();

    for view in &in_rebalance {
        let weight = next_weights(view, &valuation.share_value, &new_limits, &delta, eject)?;
        let price = next_prices(view, state.price_control)?;

        let Some((side, usd)) = imbalance(view, &weight, &new_limits, inputs.supply)? else {
            continue;
        };

        let token = view.param.token.clone();
        if usd < min_trade_usd {
            trace.on_event(TraceEvent::TokenSkipped { token, side, usd });
            continue;
        }

        trace.on_event(TraceEvent::TokenSelected {
            token: token.clone(),
            side,
            usd: usd.clone(),
        });

        let size = TokenSize {
            token: token.clone(),
            usd: to_decimal(&usd)?,
        };
        match side {
            TradeSide::Surplus => {
                surplus_total += usd;
                surplus_tokens.push(size);
            }
            TradeSide::Deficit => {
                deficit_total += usd;
                deficit_tokens.push(size);
            }
        }

        args.tokens.push(token);
        args.new_weights.push(weight);
        args.new_prices.push(price);
    }

    // {USD}
    let auction_size = precise::min(&surplus_total, &deficit_total);
    // {USD} = {USD/wholeShare} * {wholeShare}
    let total_value = &valuation.share_value * inputs.supply.to_precise();
    let target = refine_target(&plan.target, &progression.absolute, &auction_size, &total_value)?;
    let relative_target = relative_to_initial(&target, &progression.initial)?;

    trace.on_event(TraceEvent::AuctionPrepared {
        nonce: state.nonce,
        round: plan.round,
        tokens: args.tokens.len(),
        auction_size: auction_size.clone(),
    });

    let metrics = AuctionMetrics {
        round: plan.round,
        initial_progression: to_decimal(&progression.initial)?,
        absolute_progression: to_decimal(&progression.absolute)?,
        relative_progression: to_decimal(&progression.relative)?,
        target: to_decimal(&target)?,
        relative_target: to_decimal(&relative_target)?,
        auction_size: to_decimal(&auction_size)?,
        surplus_tokens,
        deficit_tokens,
    };

    Ok((args, metrics))
}

// ============================================================================
// Normalization & Safety Checks
// ============================================================================

fn token_views<'a>(
    state: &'a RebalanceState,
    inputs: &AuctionInputs,
) -> RebalanceResult<Vec<TokenView<'a>>> {
    let n = state.token_count();
    if n == 0 {
        return Err(RebalanceError::InvalidInput("rebalance has no tokens".to_string()));
    }
    ensure_len("initial_assets", n, inputs.initial_assets.len())?;
    ensure_len("target_basket", n, inputs.target_basket.len())?;
    ensure_len("current_assets", n, inputs.current_assets.len())?;
    ensure_len("decimals", n, inputs.decimals.len())?;
    ensure_len("prices", n, inputs.prices.len())?;
    ensure_len("price_errors", n, inputs.price_errors.len())?;

    if inputs.final_stage_at > Decimal::ONE || inputs.final_stage_at < Decimal::ZERO {
        return Err(RebalanceError::InvalidFinalStage(inputs.final_stage_at));
    }
    if inputs.supply.is_zero() || inputs.initial_supply.is_zero() {
        return Err(RebalanceError::InvalidInput("supply must be positive".to_string()));
    }

    let addresses = state.token_addresses();
    let prices = validated_prices(&inputs.prices, Some(&addresses))?;

    // {wholeShare}
    let supply = inputs.supply.to_precise();
    let initial_supply = inputs.initial_supply.to_precise();

    state
        .tokens
        .iter()
        .zip(prices)
        .enumerate()
        .map(|(i, (param, price))| -> RebalanceResult<TokenView<'a>> {
            let price_error = inputs.price_errors[i];
            if price_error < Decimal::ZERO || price_error >= Decimal::ONE {
                return Err(RebalanceError::InvalidPriceError {
                    token: param.token.clone(),
                    price_error,
                });
            }

            let decimals = inputs.decimals[i];
            Ok(TokenView {
                param,
                decimals,
                assets: inputs.current_assets[i],
                price,
                price_error: from_decimal(price_error),
                target: inputs.target_basket[i].to_precise(),
                held: precise::div(&whole_tokens(inputs.current_assets[i], decimals), &supply)?,
                initial_held: precise::div(
                    &whole_tokens(inputs.initial_assets[i], decimals),
                    &initial_supply,
                )?,
                spot_weight: weight_to_whole(param.weight.spot, decimals),
            })
        })
        .collect()
}

/// Every market price must sit inside the range fixed at rebalance start.
fn check_price_bounds(views: &[&TokenView]) -> RebalanceResult<()> {
    for view in views {
        let price = price_to_d27(&view.price, view.decimals)?;
        let bounds = view.param.price;
        if !bounds.contains(price) {
            return Err(RebalanceError::PriceOutOfBounds {
                token: view.param.token.clone(),
                price: price.raw_value(),
                low: bounds.low.raw_value(),
                high: bounds.high.raw_value(),
            });
        }
    }
    Ok(())
}

fn value_basket(
    views: &[&TokenView],
    onchain: &RebalanceLimits,
    policy: &AuctionPolicy,
) -> RebalanceResult<Valuation> {
    // {USD/wholeShare} = {wholeTok/wholeShare} * {USD/wholeTok}
    let share_value = precise::sum(views.iter().map(|v| &v.held * &v.price));
    let initial_share_value = precise::sum(views.iter().map(|v| &v.initial_held * &v.price));
    // {USD/wholeBU} = {wholeTok/wholeBU} * {USD/wholeTok}
    let bu_value = precise::sum(views.iter().map(|v| &v.spot_weight * &v.price));

    let divergence = from_decimal(policy.max_value_divergence);
    let diverged = share_value.is_zero()
        || bu_value.is_zero()
        || precise::div(&bu_value, &share_value)? > divergence
        || precise::div(&share_value, &bu_value)? > divergence;
    if diverged {
        return Err(RebalanceError::ValueDivergence {
            bu_value,
            share_value,
        });
    }

    if initial_share_value.is_zero() {
        return Err(RebalanceError::InvalidInput(
            "initial basket holds no value".to_string(),
        ));
    }

    let ejected_value = precise::sum(
        views
            .iter()
            .filter(|v| v.param.is_being_ejected())
            .map(|v| &v.held * &v.price),
    );
    let portion_being_ejected = precise::div(&ejected_value, &share_value)?;

    // {wholeBU/wholeShare} = {USD/wholeShare} / {USD/wholeBU}
    let spot_limit = std::cmp::max(
        precise::div(&share_value, &bu_value)?,
        onchain.spot.to_precise(),
    );

    Ok(Valuation {
        share_value,
        initial_share_value,
        bu_value,
        spot_limit,
        portion_being_ejected,
    })
}

fn measure_progression(
    views: &[&TokenView],
    valuation: &Valuation,
    trace: &dyn TraceHandler,
) -> RebalanceResult<Progression> {
    let holdings: Vec<(Holding, Holding)> = views
        .iter()
        .map(|v| {
            // {wholeTok/wholeShare} = {wholeTok/wholeBU} * {wholeBU/wholeShare}
            let expected = &v.spot_weight * &valuation.spot_limit;
            (
                Holding {
                    expected: expected.clone(),
                    held: v.held.clone(),
                    price: v.price.clone(),
                },
                Holding {
                    expected,
                    held: v.initial_held.clone(),
                    price: v.price.clone(),
                },
            )
        })
        .collect();

    let absolute = progression_of(holdings.iter().map(|(now, _)| now), &valuation.share_value)?;
    let initial = progression_of(
        holdings.iter().map(|(_, start)| start),
        &valuation.initial_share_value,
    )?;

    let progression = Progression::measure(initial, absolute.clone())?;
    if progression.clamped {
        trace.on_event(TraceEvent::ProgressionClamped {
            absolute,
            initial: progression.initial.clone(),
        });
    }
    trace.on_event(TraceEvent::ProgressionComputed {
        initial: progression.initial.clone(),
        absolute: progression.absolute.clone(),
        relative: progression.relative.clone(),
    });

    Ok(progression)
}

// ============================================================================
// Next Auction Bounds
// ============================================================================

/// D18{BU/share} limits, clamped into the on-chain limits.
fn next_limits(
    spot_limit: &BigDecimal,
    delta: &BigDecimal,
    onchain: &RebalanceLimits,
    eject: bool,
) -> RebalanceResult<RebalanceLimits> {
    let one = precise::one();

    let low = D18::from_precise(&(spot_limit * (&one - delta)))?;
    let spot = D18::from_precise(spot_limit)?;
    // surplus of kept tokens is withheld while ejecting
    let high = if eject {
        onchain.high
    } else {
        D18::from_precise(&(spot_limit * (&one + delta)))?
    };

    Ok(RebalanceLimits::new(low, spot, high).clamp_into(onchain))
}

/// D27{tok/BU} weights, clamped into the weights fixed at rebalance start.
fn next_weights(
    view: &TokenView,
    share_value: &BigDecimal,
    limits: &RebalanceLimits,
    delta: &BigDecimal,
    eject: bool,
) -> RebalanceResult<WeightRange> {
    let one = precise::one();
    let limit_low = limits.low.to_precise();
    let limit_spot = limits.spot.to_precise();
    let limit_high = limits.high.to_precise();

    // {wholeTok/wholeBU} = {USD/wholeShare} * {1} / {wholeBU/wholeShare} / {USD/wholeTok}
    let ideal = precise::div(&(share_value * &view.target), &(&limit_spot * &view.price))?;

    let low = precise::div(&(&ideal * (&one - delta) * &limit_spot), &limit_low)?;
    let spot = weight_from_whole(&ideal, view.decimals)?;
    let high = if eject {
        view.param.weight.high
    } else {
        let high = precise::div(&(&ideal * (&one + delta) * &limit_spot), &limit_high)?;
        weight_from_whole(&high, view.decimals)?
    };

    Ok(
        WeightRange::new(weight_from_whole(&low, view.decimals)?, spot, high)
            .clamp_into(&view.param.weight),
    )
}

/// D27{nanoUSD/tok} prices around the market price, inside the initial range.
fn next_prices(view: &TokenView, price_control: PriceControl) -> RebalanceResult<PriceRange> {
    let initial = view.param.price;
    if price_control == PriceControl::None {
        return Ok(initial);
    }

    let keep = precise::one() - &view.price_error;
    let range = PriceRange::new(
        price_to_d27(&(&view.price * &keep), view.decimals)?,
        price_to_d27(&precise::div(&view.price, &keep)?, view.decimals)?,
    )
    .clamp_into(&initial);

    if range.is_point() && !view.price_error.is_zero() {
        return Err(RebalanceError::DegeneratePriceRange {
            token: view.param.token.clone(),
        });
    }

    Ok(range)
}

/// Side and {USD} size of a token's gap to its buy-up-to / sell-down-to bounds.
fn imbalance(
    view: &TokenView,
    weight: &WeightRange,
    limits: &RebalanceLimits,
    supply: D18,
) -> RebalanceResult<Option<(TradeSide, BigDecimal)>> {
    // {tok}
    let buy_up_to = precise::to_scaled_int(&token_amount(weight.low, limits.low, supply))?;
    let sell_down_to =
        match precise::to_scaled_int_ceil(&token_amount(weight.high, limits.high, supply)) {
            Ok(amount) => amount,
            // an unbounded high weight never produces a surplus
            Err(NumericError::Overflow) => U256::MAX,
            Err(e) => return Err(e.into()),
        };

    let gap = if view.assets < buy_up_to {
        Some((TradeSide::Deficit, buy_up_to - view.assets))
    } else if view.assets > sell_down_to {
        Some((TradeSide::Surplus, view.assets - sell_down_to))
    } else {
        None
    };

    Ok(gap.map(|(side, amount)| (side, usd_value(amount, &view.price, view.decimals))))
}
