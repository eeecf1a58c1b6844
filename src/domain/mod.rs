// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod auction;
pub mod config;
pub mod ranges;
pub mod rebalance;

pub use auction::{AuctionMetrics, AuctionRound, OpenAuctionArgs, TokenSize, TradeSide};
pub use config::{AuctionPolicy, EngineConfig, StartPolicy};
pub use ranges::{max_token_price, max_weight, PriceRange, RebalanceLimits, WeightRange};
pub use rebalance::{
    PriceControl, RebalanceState, RebalanceWindow, TokenRebalanceParam, WeightControl,
};
