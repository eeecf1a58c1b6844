// ============================================================================
// Progression & Round Classification
// How far a rebalance has come, and what the next auction should aim for
// ============================================================================

use crate::domain::{AuctionPolicy, AuctionRound};
use crate::error::{RebalanceError, RebalanceResult};
use crate::numeric::precise::{self, from_decimal};
use crate::numeric::NumericResult;
use bigdecimal::BigDecimal;
use num_traits::One;

/// Value of one token's holdings at current prices, with its expected balance.
///
/// All quantities are per whole share.
#[derive(Debug, Clone)]
pub struct Holding {
    /// {wholeTok/wholeShare} balance the basket asks for
    pub expected: BigDecimal,
    /// {wholeTok/wholeShare} balance actually held
    pub held: BigDecimal,
    /// {USD/wholeTok}
    pub price: BigDecimal,
}

/// Fraction of `share_value` held inside the expected balances.
///
/// Holdings above `expected` count only up to `expected`, so overshooting
/// one token never inflates progress.
pub fn progression_of<'a, I>(holdings: I, share_value: &BigDecimal) -> NumericResult<BigDecimal>
where
    I: IntoIterator<Item = &'a Holding>,
{
    let inside = precise::sum(
        holdings
            .into_iter()
            .map(|h| precise::min(&h.expected, &h.held) * &h.price),
    );
    precise::div(&inside, share_value)
}

/// `(value - initial) / (1 - initial)`, or exactly 1 once `initial` is 1.
pub fn relative_to_initial(value: &BigDecimal, initial: &BigDecimal) -> NumericResult<BigDecimal> {
    if initial.is_one() {
        return Ok(precise::one());
    }
    precise::div(&(value - initial), &(precise::one() - initial))
}

/// Progression metrics for one auction round.
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    pub initial: BigDecimal,
    pub absolute: BigDecimal,
    pub relative: BigDecimal,
    /// Absolute progression was raised to `initial` by the rounding guard
    pub clamped: bool,
}

impl Progression {
    /// Combine initial and absolute progression, never letting absolute fall below initial.
    pub fn measure(initial: BigDecimal, absolute: BigDecimal) -> NumericResult<Self> {
        let clamped = absolute < initial;
        let absolute = if clamped { initial.clone() } else { absolute };
        let relative = relative_to_initial(&absolute, &initial)?;

        Ok(Self {
            initial,
            absolute,
            relative,
            clamped,
        })
    }
}

/// Round and target chosen for the next auction.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundPlan {
    pub round: AuctionRound,
    /// {1} absolute progression to reach
    pub target: BigDecimal,
}

/// Classify the next auction and pick its target.
///
/// PROGRESS while far from done, FINAL otherwise; EJECT overrides both when
/// a material share of value sits in tokens being ejected.
///
/// # Errors
/// `InvalidTarget` if the resulting target is not in `(0, 1]` or falls below
/// initial progression.
pub fn classify_round(
    progression: &Progression,
    portion_being_ejected: &BigDecimal,
    final_stage_at: &BigDecimal,
    policy: &AuctionPolicy,
) -> RebalanceResult<RoundPlan> {
    let one = precise::one();
    let ceiling = from_decimal(policy.progression_ceiling);
    let final_stage = final_stage_at - from_decimal(policy.final_stage_buffer);

    let mut plan = RoundPlan {
        round: AuctionRound::Final,
        target: one.clone(),
    };

    if progression.absolute < ceiling && progression.relative < final_stage {
        let target = &progression.initial + (&one - &progression.initial) * final_stage_at;
        if target >= from_decimal(policy.final_target_snap) {
            plan.target = one.clone();
        } else {
            plan = RoundPlan {
                round: AuctionRound::Progress,
                target,
            };
        }
    }

    if *portion_being_ejected > from_decimal(policy.ejection_threshold) {
        plan.round = AuctionRound::Eject;

        // buy a buffer above what ejection alone requires
        let ejection_target =
            &progression.absolute + portion_being_ejected * from_decimal(policy.ejection_buffer);
        if ejection_target > plan.target && ejection_target < one {
            plan.target = ejection_target;
        }
    }

    if plan.target <= precise::zero() || plan.target < progression.initial || plan.target > one {
        return Err(RebalanceError::InvalidTarget {
            target: plan.target,
            initial_progression: progression.initial.clone(),
        });
    }

    Ok(plan)
}

/// Raise `target` toward what this auction can actually deliver.
///
/// `estimate = absolute + auction_size / (share_value × supply)`, capped at 1.
pub fn refine_target(
    target: &BigDecimal,
    absolute: &BigDecimal,
    auction_size: &BigDecimal,
    total_value: &BigDecimal,
) -> NumericResult<BigDecimal> {
    let estimate = absolute + precise::div(auction_size, total_value)?;
    if estimate > *target {
        Ok(precise::min(&estimate, &precise::one()))
    } else {
        Ok(target.clone())
    }
}
