// ============================================================================
// High-Precision Decimal Helpers
// 100-significant-digit decimal math and truncation into scaled integers
// ============================================================================

use super::errors::{NumericError, NumericResult};
use bigdecimal::BigDecimal;
use ethnum::U256;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Signed, ToPrimitive, Zero};
use rust_decimal::Decimal;

/// Working precision (significant digits) of every division.
///
/// `bigdecimal` divides to this many digits by default; multiplication,
/// addition and subtraction are exact.
pub const WORKING_PRECISION: u64 = 100;

/// Largest scale tried when handing a value back as a `rust_decimal::Decimal`.
const MAX_OUTPUT_SCALE: u32 = 18;

/// `10^exp` as an exact decimal.
#[inline]
pub fn pow10(exp: u32) -> BigDecimal {
    exp10(exp as i64)
}

/// `10^exp` for any signed exponent; multiplying by it rescales exactly.
#[inline]
pub fn exp10(exp: i64) -> BigDecimal {
    BigDecimal::new(BigInt::one(), -exp)
}

/// Exact `0`.
#[inline]
pub fn zero() -> BigDecimal {
    BigDecimal::zero()
}

/// Exact `1`.
#[inline]
pub fn one() -> BigDecimal {
    BigDecimal::one()
}

/// Sum a sequence of decimals.
pub fn sum<I>(values: I) -> BigDecimal
where
    I: IntoIterator<Item = BigDecimal>,
{
    values.into_iter().fold(zero(), |acc, v| acc + v)
}

/// Checked division, rounded to [`WORKING_PRECISION`] significant digits.
///
/// # Errors
/// Returns `DivisionByZero` if `den` is zero.
#[inline]
pub fn div(num: &BigDecimal, den: &BigDecimal) -> NumericResult<BigDecimal> {
    if den.is_zero() {
        return Err(NumericError::DivisionByZero);
    }
    Ok((num / den).with_prec(WORKING_PRECISION))
}

/// Smaller of two decimals (by reference, cloned).
#[inline]
pub fn min(a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
    if a <= b {
        a.clone()
    } else {
        b.clone()
    }
}

/// Convert an exact `rust_decimal::Decimal` into the working decimal.
///
/// Lossless: the mantissa and scale are carried over unchanged.
#[inline]
pub fn from_decimal(value: Decimal) -> BigDecimal {
    BigDecimal::new(BigInt::from(value.mantissa()), value.scale() as i64)
}

/// Convert a working decimal to `rust_decimal::Decimal` for reporting.
///
/// Keeps up to 18 fractional digits, dropping fractional digits (toward zero)
/// until the mantissa fits the 96-bit `Decimal` range.
///
/// # Errors
/// Returns `Overflow` if even the integer part does not fit.
pub fn to_decimal(value: &BigDecimal) -> NumericResult<Decimal> {
    for scale in (0..=MAX_OUTPUT_SCALE).rev() {
        let (mantissa, _) = value.with_scale(scale as i64).as_bigint_and_exponent();
        if let Some(m) = mantissa.to_i128() {
            if let Ok(d) = Decimal::try_from_i128_with_scale(m, scale) {
                return Ok(d.normalize());
            }
        }
    }
    Err(NumericError::Overflow)
}

/// Convert an unsigned 256-bit integer into the working decimal.
#[inline]
pub fn from_u256(value: U256) -> BigDecimal {
    let magnitude = BigUint::from_bytes_le(&value.to_le_bytes());
    BigDecimal::from(BigInt::from_biguint(Sign::Plus, magnitude))
}

/// Truncate toward zero into an unsigned 256-bit integer.
///
/// The result never differs from the exact input by one unit or more.
///
/// # Errors
/// - `Underflow` if the value is negative (beyond `-1 < x`, which truncates to zero)
/// - `Overflow` if the value does not fit in 256 bits
pub fn to_scaled_int(value: &BigDecimal) -> NumericResult<U256> {
    let (truncated, _) = value.with_scale(0).into_bigint_and_exponent();
    if truncated.is_negative() {
        return Err(NumericError::Underflow);
    }
    bigint_to_u256(&truncated)
}

/// Round toward positive infinity into an unsigned 256-bit integer.
///
/// # Errors
/// Same as [`to_scaled_int`].
pub fn to_scaled_int_ceil(value: &BigDecimal) -> NumericResult<U256> {
    let floor = to_scaled_int(value)?;
    if &from_u256(floor) < value {
        floor.checked_add(U256::ONE).ok_or(NumericError::Overflow)
    } else {
        Ok(floor)
    }
}

fn bigint_to_u256(value: &BigInt) -> NumericResult<U256> {
    let (_, bytes) = value.to_bytes_le();
    if bytes.len() > 32 {
        return Err(NumericError::Overflow);
    }
    let mut buf = [0u8; 32];
    buf[..bytes.len()].copy_from_slice(&bytes);
    Ok(U256::from_le_bytes(buf))
}
