// ============================================================================
// On-Chain Layouts
// Version adapters between ledger record shapes and the canonical state
// ============================================================================

//! Each protocol generation lays out the rebalance record differently:
//! v4 keeps parallel per-field arrays, v5 keeps one record per token.
//! The adapters here only reshape data; every computation runs on
//! [`RebalanceState`].

mod v4;
mod v5;

pub use v4::{RebalanceV4, StartRebalanceV4};
pub use v5::{RebalanceV5, StartRebalanceV5, TokenParamsV5};

use crate::domain::{PriceControl, RebalanceState};
use crate::engine::StartRebalanceOutput;
use crate::error::{RebalanceError, RebalanceResult};
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Protocol generation of the ledger contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProtocolVersion {
    V4,
    V5,
}

/// Rebalance window timestamps as stored on-chain (unix seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RebalanceTimestamps {
    pub started_at: u64,
    pub restricted_until: u64,
    pub available_until: u64,
}

impl RebalanceTimestamps {
    fn decode(self) -> RebalanceResult<[DateTime<Utc>; 3]> {
        let decode_one = |name: &str, secs: u64| {
            i64::try_from(secs)
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .ok_or_else(|| {
                    RebalanceError::InvalidInput(format!("{} timestamp {} out of range", name, secs))
                })
        };

        Ok([
            decode_one("startedAt", self.started_at)?,
            decode_one("restrictedUntil", self.restricted_until)?,
            decode_one("availableUntil", self.available_until)?,
        ])
    }
}

fn decode_price_control(raw: u8) -> RebalanceResult<PriceControl> {
    PriceControl::try_from(raw)
        .map_err(|raw| RebalanceError::InvalidInput(format!("unknown price control {}", raw)))
}

/// Rebalance record as read from either ledger generation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OnchainRebalance {
    V4(RebalanceV4),
    V5(RebalanceV5),
}

impl OnchainRebalance {
    pub fn version(&self) -> ProtocolVersion {
        match self {
            OnchainRebalance::V4(_) => ProtocolVersion::V4,
            OnchainRebalance::V5(_) => ProtocolVersion::V5,
        }
    }

    /// Convert to the canonical per-token state.
    ///
    /// # Errors
    /// `LengthMismatch` for ragged v4 arrays, `InvalidInput` for an unknown
    /// price-control value or an unrepresentable timestamp.
    pub fn into_state(self) -> RebalanceResult<RebalanceState> {
        match self {
            OnchainRebalance::V4(record) => record.into_state(),
            OnchainRebalance::V5(record) => record.into_state(),
        }
    }
}

/// Rebalance-start call parameters in a ledger generation's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StartRebalanceCall {
    V4(StartRebalanceV4),
    V5(StartRebalanceV5),
}

impl StartRebalanceCall {
    /// Shape an initialization result for `version`.
    ///
    /// `auction_launcher_window` and `ttl` are in seconds.
    pub fn for_version(
        version: ProtocolVersion,
        output: &StartRebalanceOutput,
        auction_launcher_window: u64,
        ttl: u64,
    ) -> Self {
        match version {
            ProtocolVersion::V4 => StartRebalanceCall::V4(StartRebalanceV4::from_output(
                output,
                auction_launcher_window,
                ttl,
            )),
            ProtocolVersion::V5 => StartRebalanceCall::V5(StartRebalanceV5::from_output(
                output,
                auction_launcher_window,
                ttl,
            )),
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        match self {
            StartRebalanceCall::V4(_) => ProtocolVersion::V4,
            StartRebalanceCall::V5(_) => ProtocolVersion::V5,
        }
    }

    /// Serialize for submission to the ledger.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_timestamps() {
        let decoded = RebalanceTimestamps {
            started_at: 1_700_000_000,
            restricted_until: 1_700_001_800,
            available_until: 1_700_604_800,
        }
        .decode()
        .unwrap();

        assert_eq!(decoded[0].timestamp(), 1_700_000_000);
        assert_eq!((decoded[1] - decoded[0]).num_minutes(), 30);
        assert_eq!((decoded[2] - decoded[0]).num_days(), 7);
    }

    #[test]
    fn test_decode_timestamp_out_of_range() {
        let result = RebalanceTimestamps {
            available_until: u64::MAX,
            ..RebalanceTimestamps::default()
        }
        .decode();
        assert!(matches!(result, Err(RebalanceError::InvalidInput(_))));
    }

    #[test]
    fn test_decode_price_control() {
        assert_eq!(decode_price_control(0).unwrap(), PriceControl::None);
        assert_eq!(decode_price_control(2).unwrap(), PriceControl::Full);
        assert!(matches!(
            decode_price_control(3),
            Err(RebalanceError::InvalidInput(_))
        ));
    }
}
