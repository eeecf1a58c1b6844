// ============================================================================
// v5 Layout
// One record per token, with a per-token auction size cap
// ============================================================================

use super::{decode_price_control, RebalanceTimestamps};
use crate::domain::{PriceRange, RebalanceLimits, RebalanceState, TokenRebalanceParam, WeightRange};
use crate::engine::StartRebalanceOutput;
use crate::error::RebalanceResult;
use crate::numeric::U256;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// v5 per-token rebalance entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TokenParamsV5 {
    pub token: String,
    pub weight: WeightRange,
    pub price: PriceRange,
    pub max_auction_size: U256,
    pub in_rebalance: bool,
}

impl From<TokenParamsV5> for TokenRebalanceParam {
    fn from(params: TokenParamsV5) -> Self {
        TokenRebalanceParam {
            token: params.token,
            weight: params.weight,
            price: params.price,
            max_auction_size: params.max_auction_size,
            in_rebalance: params.in_rebalance,
        }
    }
}

impl From<&TokenRebalanceParam> for TokenParamsV5 {
    fn from(param: &TokenRebalanceParam) -> Self {
        TokenParamsV5 {
            token: param.token.clone(),
            weight: param.weight,
            price: param.price,
            max_auction_size: param.max_auction_size,
            in_rebalance: param.in_rebalance,
        }
    }
}

/// v5 rebalance record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RebalanceV5 {
    pub nonce: u64,
    pub tokens: Vec<TokenParamsV5>,
    pub limits: RebalanceLimits,
    pub timestamps: RebalanceTimestamps,
    pub price_control: u8,
}

impl RebalanceV5 {
    pub(crate) fn into_state(self) -> RebalanceResult<RebalanceState> {
        let price_control = decode_price_control(self.price_control)?;
        let [started_at, restricted_until, available_until] = self.timestamps.decode()?;

        Ok(RebalanceState {
            nonce: self.nonce,
            tokens: self.tokens.into_iter().map(TokenRebalanceParam::from).collect(),
            limits: self.limits,
            started_at,
            restricted_until,
            available_until,
            price_control,
        })
    }
}

/// v5 `startRebalance` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StartRebalanceV5 {
    pub tokens: Vec<TokenParamsV5>,
    pub limits: RebalanceLimits,
    pub auction_launcher_window: u64,
    pub ttl: u64,
}

impl StartRebalanceV5 {
    pub(crate) fn from_output(
        output: &StartRebalanceOutput,
        auction_launcher_window: u64,
        ttl: u64,
    ) -> Self {
        Self {
            tokens: output.tokens.iter().map(TokenParamsV5::from).collect(),
            limits: output.limits,
            auction_launcher_window,
            ttl,
        }
    }
}
