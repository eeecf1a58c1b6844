// ============================================================================
// Numeric Errors
// Error types for scaled-integer and high-precision conversions
// ============================================================================

use thiserror::Error;

/// Errors that can occur during fixed-point arithmetic and conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum NumericError {
    /// Result exceeded the 256-bit range
    #[error("arithmetic overflow: result exceeded maximum value")]
    Overflow,
    /// Result below zero where an unsigned value is required
    #[error("arithmetic underflow: result below minimum value")]
    Underflow,
    /// Attempted division by zero
    #[error("division by zero")]
    DivisionByZero,
    /// Conversion would lose significant digits
    #[error("precision loss: conversion would lose significant digits")]
    PrecisionLoss,
    /// Input string or value is invalid
    #[error("invalid input: could not parse value")]
    InvalidInput,
}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;
