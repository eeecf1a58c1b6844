// ============================================================================
// v4 Layout
// Parallel per-field arrays, no per-token auction size cap
// ============================================================================

use super::{decode_price_control, RebalanceTimestamps};
use crate::domain::{PriceRange, RebalanceLimits, RebalanceState, TokenRebalanceParam, WeightRange};
use crate::engine::StartRebalanceOutput;
use crate::error::{ensure_len, RebalanceResult};
use crate::numeric::U256;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// v4 rebalance record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RebalanceV4 {
    pub nonce: u64,
    pub tokens: Vec<String>,
    pub weights: Vec<WeightRange>,
    pub initial_prices: Vec<PriceRange>,
    pub in_rebalance: Vec<bool>,
    pub limits: RebalanceLimits,
    pub timestamps: RebalanceTimestamps,
    pub price_control: u8,
}

impl RebalanceV4 {
    pub(crate) fn into_state(self) -> RebalanceResult<RebalanceState> {
        let n = self.tokens.len();
        ensure_len("weights", n, self.weights.len())?;
        ensure_len("initial_prices", n, self.initial_prices.len())?;
        ensure_len("in_rebalance", n, self.in_rebalance.len())?;

        let price_control = decode_price_control(self.price_control)?;
        let [started_at, restricted_until, available_until] = self.timestamps.decode()?;

        let tokens = self
            .tokens
            .into_iter()
            .zip(self.weights)
            .zip(self.initial_prices)
            .zip(self.in_rebalance)
            .map(|(((token, weight), price), in_rebalance)| TokenRebalanceParam {
                token,
                weight,
                price,
                // v4 auctions are not size-capped
                max_auction_size: U256::MAX,
                in_rebalance,
            })
            .collect();

        Ok(RebalanceState {
            nonce: self.nonce,
            tokens,
            limits: self.limits,
            started_at,
            restricted_until,
            available_until,
            price_control,
        })
    }
}

/// v4 `startRebalance` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StartRebalanceV4 {
    pub tokens: Vec<String>,
    pub weights: Vec<WeightRange>,
    pub prices: Vec<PriceRange>,
    pub limits: RebalanceLimits,
    pub auction_launcher_window: u64,
    pub ttl: u64,
}

impl StartRebalanceV4 {
    pub(crate) fn from_output(
        output: &StartRebalanceOutput,
        auction_launcher_window: u64,
        ttl: u64,
    ) -> Self {
        Self {
            tokens: output.tokens.iter().map(|t| t.token.clone()).collect(),
            weights: output.tokens.iter().map(|t| t.weight).collect(),
            prices: output.tokens.iter().map(|t| t.price).collect(),
            limits: output.limits,
            auction_launcher_window,
            ttl,
        }
    }
}
