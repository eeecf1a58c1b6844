// ============================================================================
// Rebalance Engine
// Holds policy and trace handler once for every rebalance computation
// ============================================================================

use super::open_auction::{compute_next_auction, AuctionInputs};
use super::start_rebalance::{initialize_rebalance, StartRebalanceInputs, StartRebalanceOutput};
use crate::domain::{AuctionMetrics, EngineConfig, OpenAuctionArgs, RebalanceState};
use crate::error::{ErrorKind, RebalanceResult};
use crate::interfaces::TraceHandler;
use std::sync::Arc;

/// Stateless rebalance engine with an injected trace handler.
///
/// Every call is a pure function of its arguments, so one engine can be
/// shared across threads.
#[derive(Clone)]
pub struct RebalanceEngine {
    /// Protocol policy applied to every call
    config: EngineConfig,

    /// Observer for diagnostic trace points
    trace_handler: Arc<dyn TraceHandler>,
}

impl RebalanceEngine {
    /// Create a new rebalance engine
    pub fn new(config: EngineConfig, trace_handler: Arc<dyn TraceHandler>) -> Self {
        Self {
            config,
            trace_handler,
        }
    }

    /// Derive the seed record for a new rebalance.
    pub fn start_rebalance(
        &self,
        inputs: &StartRebalanceInputs,
    ) -> RebalanceResult<StartRebalanceOutput> {
        initialize_rebalance(inputs, &self.config.start, self.trace_handler.as_ref())
    }

    /// Compute the parameters of the next auction for `state`.
    pub fn open_auction(
        &self,
        state: &RebalanceState,
        inputs: &AuctionInputs,
    ) -> RebalanceResult<(OpenAuctionArgs, AuctionMetrics)> {
        let result = compute_next_auction(
            state,
            inputs,
            &self.config.auction,
            self.trace_handler.as_ref(),
        );

        if let Err(err) = &result {
            if err.kind() == ErrorKind::OperatorActionRequired {
                tracing::warn!(nonce = state.nonce, "{}", err);
            }
        }

        result
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
