// ============================================================================
// Engine Module
// Contains the rebalance initialization and auction-round business logic
// ============================================================================

mod open_auction;
mod progression;
mod rebalance_engine;
mod start_rebalance;

#[cfg(test)]
pub(crate) mod fixtures;

pub mod factory;

pub use factory::{create_from_config, RebalanceEngineBuilder};
pub use open_auction::{compute_next_auction, AuctionInputs};
pub use progression::{
    classify_round, progression_of, refine_target, relative_to_initial, Holding, Progression,
    RoundPlan,
};
pub use rebalance_engine::RebalanceEngine;
pub use start_rebalance::{initialize_rebalance, StartRebalanceInputs, StartRebalanceOutput};
