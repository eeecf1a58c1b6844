// ============================================================================
// Fixed-Point Scaled Integer
// On-chain 256-bit values with compile-time decimal scale
// ============================================================================

use super::errors::{NumericError, NumericResult};
use super::precise;
use bigdecimal::BigDecimal;
use ethnum::U256;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unsigned fixed-point number with compile-time scale.
///
/// Internally stores `value × 10^DECIMALS` as a `U256`, the same
/// representation the ledger contract uses.
///
/// # Type Parameter
/// - `DECIMALS`: Number of decimal places (9, 18 or 27 in this crate).
///
/// # Example
/// ```
/// use basket_rebalance::numeric::D18;
///
/// let limit: D18 = "0.9".parse().unwrap();
/// assert_eq!(limit.raw_value().as_u128(), 900_000_000_000_000_000);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct FixedPoint<const DECIMALS: u8>(U256);

/// D9 (nano) scale
pub type D9 = FixedPoint<9>;

/// D18 scale: shares, basket units per share, target shares
pub type D18 = FixedPoint<18>;

/// D27 scale: weights and prices
pub type D27 = FixedPoint<27>;

// ============================================================================
// Scale Constants
// ============================================================================

/// Compute 10^n at compile time (n <= 38)
const fn pow10(n: u8) -> u128 {
    let mut result: u128 = 1;
    let mut i = 0;
    while i < n {
        result *= 10;
        i += 1;
    }
    result
}

/// `10^n` as a 256-bit integer (n <= 77).
#[inline]
pub fn pow10_u256(n: u32) -> U256 {
    U256::new(10).pow(n)
}

impl<const D: u8> FixedPoint<D> {
    /// The scale factor (10^DECIMALS)
    pub const SCALE: U256 = U256::new(pow10(D));

    /// Zero value
    pub const ZERO: Self = Self(U256::ZERO);

    /// One (1.0)
    pub const ONE: Self = Self(U256::new(pow10(D)));

    /// Maximum representable value
    pub const MAX: Self = Self(U256::MAX);

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create from the raw on-chain representation.
    #[inline]
    pub const fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    /// Create from a raw value that fits in 128 bits.
    #[inline]
    pub const fn from_raw_u128(raw: u128) -> Self {
        Self(U256::new(raw))
    }

    /// Create from a whole-unit integer.
    ///
    /// # Errors
    /// Returns `Overflow` if the value is too large to represent.
    #[inline]
    pub fn from_integer(value: u128) -> NumericResult<Self> {
        U256::new(value)
            .checked_mul(Self::SCALE)
            .map(Self)
            .ok_or(NumericError::Overflow)
    }

    /// Scale a whole-unit decimal and truncate toward zero.
    ///
    /// # Errors
    /// `Underflow` for negative values, `Overflow` beyond 256 bits.
    #[inline]
    pub fn from_precise(value: &BigDecimal) -> NumericResult<Self> {
        precise::to_scaled_int(&(value * precise::pow10(D as u32))).map(Self)
    }

    /// Scale a whole-unit `rust_decimal::Decimal` and truncate toward zero.
    pub fn from_decimal(value: rust_decimal::Decimal) -> NumericResult<Self> {
        Self::from_precise(&precise::from_decimal(value))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get the raw internal value (scaled).
    #[inline]
    pub const fn raw_value(self) -> U256 {
        self.0
    }

    /// Whole-unit value as a high-precision decimal.
    #[inline]
    pub fn to_precise(self) -> BigDecimal {
        precise::from_u256(self.0) * precise::exp10(-(D as i64))
    }

    /// Raw scaled value as a high-precision decimal.
    #[inline]
    pub fn raw_precise(self) -> BigDecimal {
        precise::from_u256(self.0)
    }

    /// Whole-unit value as `rust_decimal::Decimal` (display/reporting only).
    pub fn to_decimal(self) -> NumericResult<rust_decimal::Decimal> {
        precise::to_decimal(&self.to_precise())
    }

    /// Get the integer part (truncated toward zero).
    #[inline]
    pub fn integer_part(self) -> U256 {
        self.0 / Self::SCALE
    }

    /// Get the fractional part (raw units below one).
    #[inline]
    pub fn fractional_part(self) -> U256 {
        self.0 % Self::SCALE
    }

    /// Check if value is zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == U256::ZERO
    }

    // ========================================================================
    // Arithmetic Operations
    // ========================================================================

    /// Checked addition.
    #[inline]
    pub fn checked_add(self, rhs: Self) -> NumericResult<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(NumericError::Overflow)
    }

    /// Checked subtraction.
    #[inline]
    pub fn checked_sub(self, rhs: Self) -> NumericResult<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(NumericError::Underflow)
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Clamp into `[low, high]`; `low` wins if the bounds are inverted.
    #[inline]
    pub fn clamp_to(self, low: Self, high: Self) -> Self {
        if self < low {
            low
        } else if self > high {
            high.max(low)
        } else {
            self
        }
    }
}

// ============================================================================
// Display and Debug
// ============================================================================

impl<const D: u8> fmt::Debug for FixedPoint<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedPoint<{}>({}, raw={})", D, self, self.0)
    }
}

impl<const D: u8> fmt::Display for FixedPoint<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if D == 0 {
            write!(f, "{}", self.integer_part())
        } else {
            write!(
                f,
                "{}.{:0>width$}",
                self.integer_part(),
                self.fractional_part().to_string(),
                width = D as usize
            )
        }
    }
}

// ============================================================================
// String Parsing
// ============================================================================

impl<const D: u8> std::str::FromStr for FixedPoint<D> {
    type Err = NumericError;

    /// Parse from a whole-unit decimal string.
    ///
    /// # Examples
    /// - "1" -> 1.000000000000000000
    /// - "0.9" -> 0.900000000000000000
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.starts_with('-') {
            return Err(NumericError::InvalidInput);
        }

        let (int_str, frac_str) = match s.find('.') {
            Some(pos) => (&s[..pos], &s[pos + 1..]),
            None => (s, ""),
        };

        if frac_str.len() > D as usize {
            return Err(NumericError::PrecisionLoss);
        }

        let int_val = if int_str.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(int_str, 10).map_err(|_| NumericError::InvalidInput)?
        };

        let frac_val = if frac_str.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{:0<width$}", frac_str, width = D as usize);
            U256::from_str_radix(&padded, 10).map_err(|_| NumericError::InvalidInput)?
        };

        int_val
            .checked_mul(Self::SCALE)
            .and_then(|v| v.checked_add(frac_val))
            .map(Self)
            .ok_or(NumericError::Overflow)
    }
}

// ============================================================================
// Tests
// ============================================================================
