// ============================================================================
// Basket Rebalance Library
// Auction parameter engine for multi-token basket rebalancing
// ============================================================================

//! # Basket Rebalance
//!
//! Computes the parameters a multi-token basket fund submits to its ledger
//! contract to start a rebalance and to open each auction round of it.
//!
//! ## Features
//!
//! - **Initialization**: weight, price and basket-unit/share limit bounds from a target basket
//! - **Auction rounds**: EJECT / PROGRESS / FINAL classification with non-regressing progression
//! - **On-chain exact numerics**: 256-bit fixed-point values, 100-digit intermediate math
//! - **Version adapters** for the v4 and v5 ledger record layouts
//! - **Trace observer** injected once instead of per-call debug flags
//!
//! ## Example
//!
//! ```rust
//! use basket_rebalance::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let engine = RebalanceEngineBuilder::new().build().unwrap();
//!
//! // 1 share holding 100 USDC, moving to 100% DAI
//! let start = engine
//!     .start_rebalance(&StartRebalanceInputs {
//!         supply: D18::ONE,
//!         tokens: vec!["USDC".to_string(), "DAI".to_string()],
//!         balances: vec![U256::new(100_000_000), U256::ZERO],
//!         decimals: vec![6, 18],
//!         target_basket: vec![D18::ZERO, D18::ONE],
//!         prices: vec![Decimal::ONE, Decimal::ONE],
//!         price_errors: vec![Decimal::new(5, 2), Decimal::new(5, 2)],
//!         max_auction_sizes_usd: vec![Decimal::from(1_000), Decimal::from(1_000)],
//!         weight_control: WeightControl::Tracking,
//!         defer_weights: false,
//!     })
//!     .unwrap();
//!
//! let state = OnchainRebalance::V5(RebalanceV5 {
//!     nonce: 1,
//!     tokens: start.tokens.iter().map(TokenParamsV5::from).collect(),
//!     limits: start.limits,
//!     timestamps: RebalanceTimestamps::default(),
//!     price_control: 1,
//! })
//! .into_state()
//! .unwrap();
//!
//! let (args, metrics) = engine
//!     .open_auction(
//!         &state,
//!         &AuctionInputs {
//!             supply: D18::ONE,
//!             initial_supply: D18::ONE,
//!             initial_assets: vec![U256::new(100_000_000), U256::ZERO],
//!             target_basket: vec![D18::ZERO, D18::ONE],
//!             current_assets: vec![U256::new(100_000_000), U256::ZERO],
//!             decimals: vec![6, 18],
//!             prices: vec![Decimal::ONE, Decimal::ONE],
//!             price_errors: vec![Decimal::new(1, 2), Decimal::new(1, 2)],
//!             final_stage_at: Decimal::new(9, 1),
//!         },
//!     )
//!     .unwrap();
//!
//! assert_eq!(metrics.round, AuctionRound::Eject);
//! println!("Auction {} over {:?}", args.rebalance_nonce, args.tokens);
//! ```

pub mod basket;
pub mod domain;
pub mod engine;
pub mod error;
pub mod interfaces;
pub mod layout;
#[cfg(feature = "logging")]
pub mod logging;
pub mod numeric;

// Re-exports for convenience
pub mod prelude {
    pub use crate::basket::{basket_accuracy, basket_distribution, target_basket};
    pub use crate::domain::{
        AuctionMetrics, AuctionPolicy, AuctionRound, EngineConfig, OpenAuctionArgs, PriceControl,
        PriceRange, RebalanceLimits, RebalanceState, RebalanceWindow, StartPolicy,
        TokenRebalanceParam, TokenSize, TradeSide, WeightControl, WeightRange,
    };
    pub use crate::engine::{
        compute_next_auction, create_from_config, initialize_rebalance, AuctionInputs,
        RebalanceEngine, RebalanceEngineBuilder, StartRebalanceInputs, StartRebalanceOutput,
    };
    pub use crate::error::{ErrorKind, RebalanceError, RebalanceResult};
    pub use crate::interfaces::{
        LoggingTraceHandler, NoOpTraceHandler, RecordingTraceHandler, TraceEvent, TraceHandler,
    };
    pub use crate::layout::{
        OnchainRebalance, ProtocolVersion, RebalanceTimestamps, RebalanceV4, RebalanceV5,
        StartRebalanceCall, TokenParamsV5,
    };
    pub use crate::numeric::{D18, D27, U256};
}
