// ============================================================================
// Basket Metrics
// Value-weighted basket vectors and basket accuracy
// ============================================================================

use crate::domain::{RebalanceLimits, WeightRange};
use crate::error::{ensure_len, RebalanceError, RebalanceResult};
use crate::numeric::precise::{self, from_decimal};
use crate::numeric::units::{weight_to_whole, whole_tokens};
use crate::numeric::{U256, D18};
use bigdecimal::BigDecimal;
use num_traits::{Signed, Zero};
use rust_decimal::Decimal;

/// Convert caller prices to the working decimal, rejecting non-positive ones.
///
/// `labels` names each token in errors; pass `None` to label by index.
pub(crate) fn validated_prices(
    prices: &[Decimal],
    labels: Option<&[String]>,
) -> RebalanceResult<Vec<BigDecimal>> {
    prices
        .iter()
        .enumerate()
        .map(|(i, price)| {
            if *price <= Decimal::ZERO {
                let token = labels
                    .and_then(|l| l.get(i).cloned())
                    .unwrap_or_else(|| format!("#{}", i));
                return Err(RebalanceError::MissingPrice { token });
            }
            Ok(from_decimal(*price))
        })
        .collect()
}

/// Normalize per-token USD values into a D18 vector summing to ~1e18.
fn normalize(values: Vec<BigDecimal>) -> RebalanceResult<Vec<D18>> {
    let total = precise::sum(values.iter().cloned());
    values
        .iter()
        .map(|value| {
            let share = precise::div(value, &total)?;
            Ok(D18::from_precise(&share)?)
        })
        .collect()
}

/// Current value distribution of a basket.
///
/// D18{1} per token: `balance × price / totalValue`.
///
/// # Errors
/// - `LengthMismatch` if the vectors differ in length
/// - `Numeric(DivisionByZero)` if the basket holds no value
///
/// A token priced at zero contributes no value.
pub fn basket_distribution(
    balances: &[U256],
    prices: &[Decimal],
    decimals: &[u8],
) -> RebalanceResult<Vec<D18>> {
    ensure_len("prices", balances.len(), prices.len())?;
    ensure_len("decimals", balances.len(), decimals.len())?;

    // {USD} = {wholeTok} * {USD/wholeTok}
    let values = balances
        .iter()
        .zip(decimals)
        .zip(prices)
        .map(|((balance, decimals), price)| {
            whole_tokens(*balance, *decimals) * from_decimal(*price)
        })
        .collect();

    normalize(values)
}

/// Target basket implied by a set of weights at the given prices.
///
/// D18{1} per token: `weight.spot × price / buValue`.
///
/// # Errors
/// - `LengthMismatch` if the vectors differ in length
/// - `MissingPrice` if any price is not positive
/// - `Numeric(DivisionByZero)` if every spot weight is zero
pub fn target_basket(
    weights: &[WeightRange],
    prices: &[Decimal],
    decimals: &[u8],
) -> RebalanceResult<Vec<D18>> {
    ensure_len("prices", weights.len(), prices.len())?;
    ensure_len("decimals", weights.len(), decimals.len())?;
    let prices = validated_prices(prices, None)?;

    // {USD/wholeBU} = {wholeTok/wholeBU} * {USD/wholeTok}
    let values = weights
        .iter()
        .zip(decimals)
        .zip(&prices)
        .map(|((weight, decimals), price)| weight_to_whole(weight.spot, *decimals) * price)
        .collect();

    normalize(values)
}

/// Fraction of basket value that sits inside the expected balances.
///
/// Expected balance per token is `weight.spot × limits.spot × supply`;
/// value held above it counts as surplus. Returns `1 - surplus / total`.
///
/// # Errors
/// - `LengthMismatch` if the vectors differ in length
/// - `MissingPrice` if any price is not positive
/// - `InvalidInput` if supply is zero or the basket holds no value
pub fn basket_accuracy(
    supply: D18,
    balances: &[U256],
    prices: &[Decimal],
    decimals: &[u8],
    weights: &[WeightRange],
    limits: &RebalanceLimits,
) -> RebalanceResult<Decimal> {
    ensure_len("prices", balances.len(), prices.len())?;
    ensure_len("decimals", balances.len(), decimals.len())?;
    ensure_len("weights", balances.len(), weights.len())?;
    let prices = validated_prices(prices, None)?;

    if supply.is_zero() {
        return Err(RebalanceError::InvalidInput("supply must be positive".to_string()));
    }

    // {wholeShare}
    let supply = supply.to_precise();
    // {wholeBU/wholeShare}
    let spot_limit = limits.spot.to_precise();

    let mut total_value = precise::zero();
    let mut surplus_value = precise::zero();

    for (i, price) in prices.iter().enumerate() {
        // {wholeTok/wholeShare}
        let held = precise::div(&whole_tokens(balances[i], decimals[i]), &supply)?;
        let expected = weight_to_whole(weights[i].spot, decimals[i]) * &spot_limit;

        total_value += &held * price;

        let excess = &held - &expected;
        if excess.is_positive() {
            surplus_value += excess * price;
        }
    }

    if total_value.is_zero() {
        return Err(RebalanceError::InvalidInput("basket holds no value".to_string()));
    }

    let accuracy = precise::one() - precise::div(&surplus_value, &total_value)?;
    Ok(precise::to_decimal(&accuracy)?)
}
