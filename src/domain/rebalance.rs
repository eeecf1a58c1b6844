// ============================================================================
// Rebalance Domain Model
// Canonical on-chain rebalance record consumed by the auction engine
// ============================================================================

use super::ranges::{PriceRange, RebalanceLimits, WeightRange};
use chrono::{DateTime, Utc};
use ethnum::U256;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

/// Whether auction price ranges may move relative to the rebalance's
/// initial prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PriceControl {
    /// Auctions reuse the initial price ranges unchanged
    None = 0,
    /// Auctions may narrow prices inside the initial ranges
    #[default]
    Partial = 1,
    /// Auction launcher controls prices inside the initial ranges
    Full = 2,
}

impl TryFrom<u8> for PriceControl {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PriceControl::None),
            1 => Ok(PriceControl::Partial),
            2 => Ok(PriceControl::Full),
            other => Err(other),
        }
    }
}

/// How the basket's BU/share ratio behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WeightControl {
    /// Weights are pegged; the BU/share ratio floats within limits
    Tracking,
    /// The BU/share ratio is fixed at 1; weights float within ranges
    Native,
}

/// One token's entry in the rebalance record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TokenRebalanceParam {
    /// Token identifier (contract address)
    pub token: String,
    /// D27{tok/BU}
    pub weight: WeightRange,
    /// D27{nanoUSD/tok}, fixed at rebalance start
    pub price: PriceRange,
    /// {tok} largest amount a single auction may move
    pub max_auction_size: U256,
    pub in_rebalance: bool,
}

impl TokenRebalanceParam {
    /// A token being driven to zero holdings.
    pub fn is_being_ejected(&self) -> bool {
        self.in_rebalance && self.weight.spot.is_zero()
    }
}

// ============================================================================
// Rebalance Window
// ============================================================================

/// Where a point in time sits relative to the rebalance's timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RebalanceWindow {
    /// Only the auction launcher may open auctions
    Restricted,
    /// Anyone may open auctions
    Open,
    /// No further auctions can be opened
    Expired,
}

// ============================================================================
// Rebalance State
// ============================================================================

/// Snapshot of an in-progress rebalance, read from the ledger contract.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RebalanceState {
    pub nonce: u64,
    pub tokens: Vec<TokenRebalanceParam>,
    /// D18{BU/share}
    pub limits: RebalanceLimits,
    pub started_at: DateTime<Utc>,
    pub restricted_until: DateTime<Utc>,
    pub available_until: DateTime<Utc>,
    pub price_control: PriceControl,
}

impl RebalanceState {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn token_addresses(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.token.clone()).collect()
    }

    /// Classify `now` against the restricted/available timestamps.
    pub fn window_at(&self, now: DateTime<Utc>) -> RebalanceWindow {
        if now >= self.available_until {
            RebalanceWindow::Expired
        } else if now < self.restricted_until {
            RebalanceWindow::Restricted
        } else {
            RebalanceWindow::Open
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::D27;
    use chrono::Duration;

    fn state_at(start: DateTime<Utc>) -> RebalanceState {
        RebalanceState {
            nonce: 1,
            tokens: vec![TokenRebalanceParam {
                token: "USDC".to_string(),
                weight: WeightRange::point(D27::ZERO),
                price: PriceRange::default(),
                max_auction_size: U256::MAX,
                in_rebalance: true,
            }],
            limits: RebalanceLimits::fixed(),
            started_at: start,
            restricted_until: start + Duration::minutes(30),
            available_until: start + Duration::hours(24),
            price_control: PriceControl::Partial,
        }
    }

    #[test]
    fn test_window_transitions() {
        let start = Utc::now();
        let state = state_at(start);

        assert_eq!(state.window_at(start), RebalanceWindow::Restricted);
        assert_eq!(
            state.window_at(start + Duration::hours(1)),
            RebalanceWindow::Open
        );
        assert_eq!(
            state.window_at(start + Duration::hours(24)),
            RebalanceWindow::Expired
        );
    }

    #[test]
    fn test_ejection_flag() {
        let state = state_at(Utc::now());
        assert!(state.tokens[0].is_being_ejected());

        let mut idle = state.tokens[0].clone();
        idle.in_rebalance = false;
        assert!(!idle.is_being_ejected());
    }

    #[test]
    fn test_price_control_from_u8() {
        assert_eq!(PriceControl::try_from(0), Ok(PriceControl::None));
        assert_eq!(PriceControl::try_from(2), Ok(PriceControl::Full));
        assert_eq!(PriceControl::try_from(7), Err(7));
    }
}
