// ============================================================================
// Rebalance Engine Factory
// Creates rebalance engines from validated configuration
// ============================================================================

use crate::domain::{AuctionPolicy, EngineConfig, StartPolicy};
use crate::engine::RebalanceEngine;
use crate::error::{RebalanceError, RebalanceResult};
use crate::interfaces::{NoOpTraceHandler, TraceHandler};
use rust_decimal::Decimal;
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a rebalance engine from configuration
///
/// # Arguments
/// * `config` - Engine policy
/// * `trace_handler` - Observer for trace events
///
/// # Example
/// ```
/// use basket_rebalance::prelude::*;
/// use basket_rebalance::engine::factory::create_from_config;
/// use std::sync::Arc;
///
/// let engine = create_from_config(EngineConfig::protocol_defaults(), Arc::new(NoOpTraceHandler)).unwrap();
/// ```
pub fn create_from_config(
    config: EngineConfig,
    trace_handler: Arc<dyn TraceHandler>,
) -> RebalanceResult<RebalanceEngine> {
    config.validate().map_err(RebalanceError::InvalidConfig)?;
    Ok(RebalanceEngine::new(config, trace_handler))
}

// ============================================================================
// Builder Pattern for Advanced Configuration
// ============================================================================

/// Builder for creating rebalance engines with fluent API
///
/// # Example
/// ```
/// use basket_rebalance::prelude::*;
/// use basket_rebalance::engine::factory::RebalanceEngineBuilder;
/// use rust_decimal::Decimal;
///
/// let engine = RebalanceEngineBuilder::new()
///     .max_price_error(Some(Decimal::new(5, 1)))
///     .min_trade_usd(Decimal::from(10))
///     .with_logging()
///     .build()
///     .unwrap();
/// ```
pub struct RebalanceEngineBuilder {
    config: EngineConfig,
    trace_handler: Arc<dyn TraceHandler>,
}

impl Default for RebalanceEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RebalanceEngineBuilder {
    /// Create a builder with protocol defaults and no tracing
    pub fn new() -> Self {
        Self {
            config: EngineConfig::protocol_defaults(),
            trace_handler: Arc::new(NoOpTraceHandler),
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    // ========================================================================
    // Initialization Policy
    // ========================================================================

    /// Replace the initialization policy
    pub fn start_policy(mut self, policy: StartPolicy) -> Self {
        self.config.start = policy;
        self
    }

    /// Set the per-token price error ceiling (None = only `< 1` enforced)
    pub fn max_price_error(mut self, ceiling: Option<Decimal>) -> Self {
        self.config.start.max_price_error = ceiling;
        self
    }

    // ========================================================================
    // Auction Policy
    // ========================================================================

    /// Replace the auction policy
    pub fn auction_policy(mut self, policy: AuctionPolicy) -> Self {
        self.config.auction = policy;
        self
    }

    /// Set the USD materiality floor for token selection
    pub fn min_trade_usd(mut self, floor: Decimal) -> Self {
        self.config.auction.min_trade_usd = floor;
        self
    }

    /// Set the ejected-value share that triggers EJECT rounds
    pub fn ejection_threshold(mut self, threshold: Decimal) -> Self {
        self.config.auction.ejection_threshold = threshold;
        self
    }

    // ========================================================================
    // Tracing
    // ========================================================================

    /// Use a custom trace handler
    pub fn trace_handler(mut self, handler: Arc<dyn TraceHandler>) -> Self {
        self.trace_handler = handler;
        self
    }

    /// Forward trace events to `tracing` at debug level
    pub fn with_logging(self) -> Self {
        self.trace_handler(Arc::new(crate::interfaces::LoggingTraceHandler))
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the rebalance engine
    pub fn build(self) -> RebalanceResult<RebalanceEngine> {
        create_from_config(self.config, self.trace_handler)
    }

    /// Get the configuration without building (for inspection)
    pub fn get_config(&self) -> &EngineConfig {
        &self.config
    }
}
