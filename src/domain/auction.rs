// ============================================================================
// Auction Domain Model
// Output of one auction-round computation
// ============================================================================

use super::ranges::{PriceRange, RebalanceLimits, WeightRange};
use rust_decimal::Decimal;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Classification of the auction about to be opened.
///
/// Recomputed on every call; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AuctionRound {
    /// Tokens with a zero target weight are still held
    Eject,
    /// Working toward the final-stage target
    Progress,
    /// Closing the remaining gap to the target basket
    Final,
}

impl fmt::Display for AuctionRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuctionRound::Eject => write!(f, "EJECT"),
            AuctionRound::Progress => write!(f, "PROGRESS"),
            AuctionRound::Final => write!(f, "FINAL"),
        }
    }
}

/// Direction of a token's imbalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TradeSide {
    /// Held above the sell-down-to ceiling
    Surplus,
    /// Held below the buy-up-to floor
    Deficit,
}

/// USD size of one token's imbalance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TokenSize {
    pub token: String,
    /// {USD}
    pub usd: Decimal,
}

/// Call parameters for the ledger's auction-opening entry point.
///
/// `tokens`, `new_weights` and `new_prices` are parallel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpenAuctionArgs {
    pub rebalance_nonce: u64,
    pub tokens: Vec<String>,
    pub new_weights: Vec<WeightRange>,
    pub new_prices: Vec<PriceRange>,
    pub new_limits: RebalanceLimits,
}

impl OpenAuctionArgs {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Weight and price ranges for one included token.
    pub fn ranges_for(&self, token: &str) -> Option<(&WeightRange, &PriceRange)> {
        let index = self.tokens.iter().position(|t| t == token)?;
        Some((&self.new_weights[index], &self.new_prices[index]))
    }

    /// Serialize for submission by the auction launcher.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Progress metrics describing how complete the rebalance is.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuctionMetrics {
    pub round: AuctionRound,
    /// {1} progression of the balances recorded at rebalance start
    pub initial_progression: Decimal,
    /// {1} progression of the current balances
    pub absolute_progression: Decimal,
    /// {1} share of the remaining distance already covered
    pub relative_progression: Decimal,
    /// {1} absolute progression this auction aims for
    pub target: Decimal,
    /// {1} target relative to the starting point
    pub relative_target: Decimal,
    /// {USD} min(total surplus, total deficit)
    pub auction_size: Decimal,
    pub surplus_tokens: Vec<TokenSize>,
    pub deficit_tokens: Vec<TokenSize>,
}

impl AuctionMetrics {
    /// {USD} sum of surplus sizes
    pub fn surplus_total(&self) -> Decimal {
        self.surplus_tokens.iter().map(|t| t.usd).sum()
    }

    /// {USD} sum of deficit sizes
    pub fn deficit_total(&self) -> Decimal {
        self.deficit_tokens.iter().map(|t| t.usd).sum()
    }
}
