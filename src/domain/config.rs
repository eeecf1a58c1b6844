// ============================================================================
// Engine Configuration
// Protocol policy constants for rebalance initialization and auction rounds
// ============================================================================

use rust_decimal::Decimal;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Initialization Policy
// ============================================================================

/// Policy applied when deriving the starting bounds of a rebalance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StartPolicy {
    /// Ceiling on any per-token price error (None = only `< 1` enforced)
    pub max_price_error: Option<Decimal>,

    /// Largest allowed `high / low` ratio of an initial price range
    pub max_price_ratio: u32,

    /// Largest downward adjustment (raw D27 units) tolerated when clamping
    /// the price range to `max_price_ratio`
    pub price_ratio_slack: u64,
}

impl Default for StartPolicy {
    fn default() -> Self {
        Self {
            max_price_error: Some(Decimal::new(9, 1)),
            max_price_ratio: 100,
            price_ratio_slack: 100,
        }
    }
}

// ============================================================================
// Auction Policy
// ============================================================================

/// Thresholds steering round classification and token selection.
///
/// The defaults are protocol policy; change them only deliberately.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuctionPolicy {
    /// Absolute progression at or above which PROGRESS rounds stop (0.99)
    pub progression_ceiling: Decimal,

    /// PROGRESS rounds stop once relative progression is within this
    /// distance of `finalStageAt` (0.02)
    pub final_stage_buffer: Decimal,

    /// A PROGRESS target at or above this snaps to 1 (0.997)
    pub final_target_snap: Decimal,

    /// Ejected share-value portion above which the round is EJECT (1e-5)
    pub ejection_threshold: Decimal,

    /// Multiplier on the ejected portion when targeting an ejection (1.1)
    pub ejection_buffer: Decimal,

    /// Largest tolerated ratio between BU value and share value (10)
    pub max_value_divergence: Decimal,

    /// Smallest USD gap that makes a token worth auctioning (1)
    pub min_trade_usd: Decimal,
}

impl Default for AuctionPolicy {
    fn default() -> Self {
        Self {
            progression_ceiling: Decimal::new(99, 2),
            final_stage_buffer: Decimal::new(2, 2),
            final_target_snap: Decimal::new(997, 3),
            ejection_threshold: Decimal::new(1, 5),
            ejection_buffer: Decimal::new(11, 1),
            max_value_divergence: Decimal::from(10),
            min_trade_usd: Decimal::ONE,
        }
    }
}

// ============================================================================
// Complete Engine Configuration
// ============================================================================

/// Comprehensive configuration for a rebalance engine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    pub start: StartPolicy,
    pub auction: AuctionPolicy,
}

impl EngineConfig {
    pub fn new(start: StartPolicy, auction: AuctionPolicy) -> Self {
        Self { start, auction }
    }

    /// Builder method: Set the per-token price error ceiling
    pub fn with_max_price_error(mut self, ceiling: Option<Decimal>) -> Self {
        self.start.max_price_error = ceiling;
        self
    }

    /// Builder method: Set the USD materiality floor
    pub fn with_min_trade_usd(mut self, floor: Decimal) -> Self {
        self.auction.min_trade_usd = floor;
        self
    }

    /// Builder method: Set the ejection materiality threshold
    pub fn with_ejection_threshold(mut self, threshold: Decimal) -> Self {
        self.auction.ejection_threshold = threshold;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let one = Decimal::ONE;

        if let Some(ceiling) = self.start.max_price_error {
            if ceiling <= Decimal::ZERO || ceiling >= one {
                return Err("Price error ceiling must be between 0 and 1".to_string());
            }
        }

        if self.start.max_price_ratio < 2 {
            return Err("Price ratio bound must be at least 2".to_string());
        }

        let auction = &self.auction;
        for (name, value) in [
            ("Progression ceiling", auction.progression_ceiling),
            ("Final target snap", auction.final_target_snap),
        ] {
            if value <= Decimal::ZERO || value > one {
                return Err(format!("{} must be in (0, 1]", name));
            }
        }

        if auction.final_stage_buffer < Decimal::ZERO || auction.final_stage_buffer >= one {
            return Err("Final stage buffer must be in [0, 1)".to_string());
        }

        if auction.ejection_threshold < Decimal::ZERO {
            return Err("Ejection threshold cannot be negative".to_string());
        }

        if auction.ejection_buffer < one {
            return Err("Ejection buffer must be at least 1".to_string());
        }

        if auction.max_value_divergence <= one {
            return Err("Value divergence bound must exceed 1".to_string());
        }

        if auction.min_trade_usd < Decimal::ZERO {
            return Err("Minimum trade size cannot be negative".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Preset Configurations (Factory Methods)
// ============================================================================

impl EngineConfig {
    /// Protocol defaults: price error capped at 0.9, $1 materiality floor
    pub fn protocol_defaults() -> Self {
        Self::default()
    }

    /// No price-error ceiling beyond the hard `< 1` requirement
    pub fn uncapped_price_error() -> Self {
        Self::default().with_max_price_error(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_protocol_constants() {
        let config = EngineConfig::protocol_defaults();
        assert_eq!(config.auction.progression_ceiling.to_string(), "0.99");
        assert_eq!(config.auction.final_target_snap.to_string(), "0.997");
        assert_eq!(config.auction.ejection_threshold.to_string(), "0.00001");
        assert_eq!(config.auction.ejection_buffer.to_string(), "1.1");
        assert_eq!(config.auction.max_value_divergence, Decimal::from(10));
        assert_eq!(config.auction.min_trade_usd, Decimal::ONE);
        assert_eq!(config.start.max_price_error, Some(Decimal::new(9, 1)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::default()
            .with_min_trade_usd(Decimal::from(5))
            .with_max_price_error(None);

        assert_eq!(config.auction.min_trade_usd, Decimal::from(5));
        assert_eq!(config.start.max_price_error, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = EngineConfig::default().with_max_price_error(Some(Decimal::ONE));
        assert!(config.validate().is_err());

        let config = EngineConfig::default().with_min_trade_usd(Decimal::NEGATIVE_ONE);
        assert!(config.validate().is_err());
    }
}
