// ============================================================================
// Rebalance Errors
// Error taxonomy surfaced by the initialization and auction engines
// ============================================================================

use crate::numeric::NumericError;
use bigdecimal::BigDecimal;
use ethnum::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// Coarse classification of a [`RebalanceError`], telling the caller what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed inputs: fix or refresh inputs and retry
    InputValidation,
    /// Missing or implausible price data: refresh prices and retry
    PriceData,
    /// Price drifted outside the rebalance bounds: the rebalance must be closed
    OperatorActionRequired,
    /// Internal invariant broken: stop and investigate
    InvariantViolation,
    /// Price clamping collapsed a non-zero-error range to a point
    DegeneratePriceRange,
    /// Aggregate basket error at initialization is >= 1
    BasketErrorTooLarge,
}

/// Errors returned by the rebalance engines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RebalanceError {
    #[error("length mismatch: {field} has {got} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("finalStageAt must be in [0, 1] (got {0})")]
    InvalidFinalStage(Decimal),

    #[error("missing price for token {token}")]
    MissingPrice { token: String },

    #[error("invalid price error {price_error} for token {token}")]
    InvalidPriceError { token: String, price_error: Decimal },

    #[error("unsupported mode: {0}")]
    UnsupportedMode(&'static str),

    #[error("invalid weights for token {token}: {reason}")]
    InvalidWeights { token: String, reason: String },

    #[error("invalid prices for token {token}: {reason}")]
    InvalidPrices { token: String, reason: String },

    #[error("max auction size rounds to zero for token {token}")]
    ZeroAuctionSize { token: String },

    #[error("basket error {basket_error} must be less than 1")]
    BasketErrorTooLarge { basket_error: BigDecimal },

    #[error(
        "Token price out of bounds -- must close rebalance! {token}: {price} not in [{low}, {high}]"
    )]
    PriceOutOfBounds {
        token: String,
        price: U256,
        low: U256,
        high: U256,
    },

    #[error("basket unit value {bu_value} and share value {share_value} are too different")]
    ValueDivergence {
        bu_value: BigDecimal,
        share_value: BigDecimal,
    },

    #[error("rebalance target {target} out of range (initial progression {initial_progression})")]
    InvalidTarget {
        target: BigDecimal,
        initial_progression: BigDecimal,
    },

    #[error("no price range for token {token}: clamped range collapsed to a point")]
    DegeneratePriceRange { token: String },

    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    #[error("numeric error: {0}")]
    Numeric(#[from] NumericError),
}

impl RebalanceError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RebalanceError::LengthMismatch { .. }
            | RebalanceError::InvalidInput(_)
            | RebalanceError::InvalidConfig(_)
            | RebalanceError::InvalidFinalStage(_)
            | RebalanceError::InvalidPriceError { .. }
            | RebalanceError::UnsupportedMode(_)
            | RebalanceError::InvalidWeights { .. }
            | RebalanceError::ZeroAuctionSize { .. } => ErrorKind::InputValidation,

            RebalanceError::MissingPrice { .. } | RebalanceError::InvalidPrices { .. } => {
                ErrorKind::PriceData
            }

            RebalanceError::PriceOutOfBounds { .. } => ErrorKind::OperatorActionRequired,

            RebalanceError::ValueDivergence { .. }
            | RebalanceError::InvalidTarget { .. }
            | RebalanceError::InternalInvariant(_)
            | RebalanceError::Numeric(_) => ErrorKind::InvariantViolation,

            RebalanceError::DegeneratePriceRange { .. } => ErrorKind::DegeneratePriceRange,

            RebalanceError::BasketErrorTooLarge { .. } => ErrorKind::BasketErrorTooLarge,
        }
    }

    /// Whether retrying with refreshed inputs can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InputValidation | ErrorKind::PriceData
        )
    }
}

/// Result type alias for rebalance operations
pub type RebalanceResult<T> = Result<T, RebalanceError>;

/// Fail with `LengthMismatch` unless `got == expected`.
pub(crate) fn ensure_len(field: &'static str, expected: usize, got: usize) -> RebalanceResult<()> {
    if expected != got {
        return Err(RebalanceError::LengthMismatch {
            field,
            expected,
            got,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_must_close_wording() {
        let err = RebalanceError::PriceOutOfBounds {
            token: "DAI".to_string(),
            price: U256::new(2),
            low: U256::new(3),
            high: U256::new(4),
        };
        assert!(err.to_string().contains("must close rebalance"));
        assert_eq!(err.kind(), ErrorKind::OperatorActionRequired);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            RebalanceError::MissingPrice {
                token: "USDC".to_string()
            }
            .kind(),
            ErrorKind::PriceData
        );
        assert_eq!(
            RebalanceError::InternalInvariant("x".to_string()).kind(),
            ErrorKind::InvariantViolation
        );
        assert_eq!(
            RebalanceError::from(NumericError::DivisionByZero).kind(),
            ErrorKind::InvariantViolation
        );
        assert!(RebalanceError::InvalidFinalStage(Decimal::TWO).is_retryable());
    }

    #[test]
    fn test_final_stage_wording() {
        let err = RebalanceError::InvalidFinalStage(Decimal::new(-1, 1));
        assert_eq!(err.to_string(), "finalStageAt must be in [0, 1] (got -0.1)");
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("prices", 3, 3).is_ok());
        assert_eq!(
            ensure_len("prices", 3, 2),
            Err(RebalanceError::LengthMismatch {
                field: "prices",
                expected: 3,
                got: 2
            })
        );
    }
}
