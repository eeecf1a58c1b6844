// ============================================================================
// Numeric Module
// Scaled-integer and high-precision decimal arithmetic for rebalance math
// ============================================================================
//
// This module provides:
// - FixedPoint<D>: on-chain scaled integer (256-bit) with compile-time scale
// - precise: 100-digit decimal helpers used for every intermediate ratio
// - units: on-chain scaled integers <-> whole-unit decimals
// - NumericError: Error types for arithmetic and conversion
//
// Design principles:
// - No floating-point operations
// - All conversions return Result (no panics)
// - Truncation toward zero happens only when producing a scaled integer
// - Three fixed scales: D9 (nano-USD), D18 (shares, limits), D27 (weights, prices)

mod errors;
mod fixed_point;
pub mod precise;
pub mod units;

pub use errors::{NumericError, NumericResult};
pub use fixed_point::{pow10_u256, FixedPoint, D18, D27, D9};

/// 256-bit unsigned integer used for every on-chain amount.
pub use ethnum::U256;
