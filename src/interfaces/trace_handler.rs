// ============================================================================
// Trace Handler Interface
// Observer invoked at defined points of the rebalance computations
// ============================================================================

use crate::domain::{AuctionRound, RebalanceLimits, TradeSide, WeightControl};
use bigdecimal::BigDecimal;
use ethnum::U256;
use parking_lot::Mutex;

/// Diagnostic events emitted while computing rebalance parameters
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// Initial bounds derived for a new rebalance
    RebalanceInitialized {
        tokens: usize,
        weight_control: WeightControl,
        basket_error: BigDecimal,
    },

    /// Initial price range exceeded the ratio bound and `high` was lowered
    PriceRangeClamped {
        token: String,
        original_high: U256,
        clamped_high: U256,
    },

    /// Max auction size did not fit and was saturated
    AuctionSizeSaturated { token: String },

    /// Valuation of the basket at current prices
    ValuesComputed {
        share_value: BigDecimal,
        bu_value: BigDecimal,
        spot_limit: BigDecimal,
        portion_being_ejected: BigDecimal,
    },

    /// Absolute progression fell below initial progression through rounding
    ProgressionClamped {
        absolute: BigDecimal,
        initial: BigDecimal,
    },

    /// Progression metrics for this round
    ProgressionComputed {
        initial: BigDecimal,
        absolute: BigDecimal,
        relative: BigDecimal,
    },

    /// Round classification and target chosen
    RoundClassified {
        round: AuctionRound,
        target: BigDecimal,
    },

    /// New basket-unit/share limits after clamping
    LimitsComputed { limits: RebalanceLimits },

    /// Token included in the auction
    TokenSelected {
        token: String,
        side: TradeSide,
        usd: BigDecimal,
    },

    /// Token imbalance below the USD materiality floor
    TokenSkipped {
        token: String,
        side: TradeSide,
        usd: BigDecimal,
    },

    /// Auction parameters complete
    AuctionPrepared {
        nonce: u64,
        round: AuctionRound,
        tokens: usize,
        auction_size: BigDecimal,
    },
}

/// Trace handler trait for observing engine computations.
/// Implementations can handle logging, audits, metrics, etc.
pub trait TraceHandler: Send + Sync {
    /// Handle a trace event
    fn on_event(&self, event: TraceEvent);
}

/// No-op trace handler
pub struct NoOpTraceHandler;

impl TraceHandler for NoOpTraceHandler {
    fn on_event(&self, _event: TraceEvent) {
        // Do nothing
    }
}

/// Logging trace handler
pub struct LoggingTraceHandler;

impl TraceHandler for LoggingTraceHandler {
    fn on_event(&self, event: TraceEvent) {
        tracing::debug!("Rebalance engine event: {:?}", event);
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Default)]
pub struct RecordingTraceHandler {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTraceHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }

    /// Drain the recorded events
    pub fn take(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl TraceHandler for RecordingTraceHandler {
    fn on_event(&self, event: TraceEvent) {
        self.events.lock().push(event);
    }
}
