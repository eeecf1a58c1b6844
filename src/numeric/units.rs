// ============================================================================
// Unit Conversions
// On-chain scaled integers <-> whole-unit decimals
// ============================================================================
//
// Unit notation used throughout the crate:
//   {tok}       token base units          {wholeTok}   whole tokens
//   {share}     share base units          {wholeShare} whole shares
//   {BU}        basket-unit base units    {wholeBU}    whole basket units
//   D27{tok/BU} weight, D27{nanoUSD/tok} price, D18{BU/share} limit

use super::errors::NumericResult;
use super::fixed_point::{D18, D27};
use super::precise::{self, exp10};
use bigdecimal::BigDecimal;
use ethnum::U256;

/// `weight_raw * limit_raw * supply_raw / 10^45` gives {tok}.
const TOKEN_AMOUNT_SHIFT: i64 = 45;

/// {wholeTok} = {tok} / {tok/wholeTok}
#[inline]
pub fn whole_tokens(amount: U256, decimals: u8) -> BigDecimal {
    precise::from_u256(amount) * exp10(-(decimals as i64))
}

/// {wholeTok/wholeBU} = D27{tok/BU} * {BU/wholeBU} / {tok/wholeTok} / D27
#[inline]
pub fn weight_to_whole(weight: D27, decimals: u8) -> BigDecimal {
    weight.to_precise() * exp10(18 - decimals as i64)
}

/// D27{tok/BU} = {wholeTok/wholeBU} * D27 * {tok/wholeTok} / {BU/wholeBU}, truncated
#[inline]
pub fn weight_from_whole(whole: &BigDecimal, decimals: u8) -> NumericResult<D27> {
    D27::from_precise(&(whole * exp10(decimals as i64 - 18)))
}

/// D27{nanoUSD/tok} = {USD/wholeTok} * {nanoUSD/USD} / {tok/wholeTok} * D27, truncated
#[inline]
pub fn price_to_d27(usd_per_whole: &BigDecimal, decimals: u8) -> NumericResult<D27> {
    D27::from_precise(&(usd_per_whole * exp10(9 - decimals as i64)))
}

/// {USD/wholeTok} from D27{nanoUSD/tok}
#[inline]
pub fn price_from_d27(price: D27, decimals: u8) -> BigDecimal {
    price.to_precise() * exp10(decimals as i64 - 9)
}

/// {USD} = {tok} * {USD/wholeTok} / {tok/wholeTok}
#[inline]
pub fn usd_value(amount: U256, usd_per_whole: &BigDecimal, decimals: u8) -> BigDecimal {
    whole_tokens(amount, decimals) * usd_per_whole
}

/// {tok} = D27{tok/BU} * D18{BU/share} * {share} / D27 / D18, exact
#[inline]
pub fn token_amount(weight: D27, limit: D18, supply: D18) -> BigDecimal {
    weight.raw_precise() * limit.raw_precise() * supply.raw_precise() * exp10(-TOKEN_AMOUNT_SHIFT)
}
