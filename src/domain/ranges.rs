// ============================================================================
// Range Value Objects
// Weight, price and basket-unit/share limit bounds
// ============================================================================

use crate::numeric::{pow10_u256, D18, D27};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Protocol maximum for any weight bound: 1e54 D27{tok/BU} (1e27 raw whole units)
pub fn max_weight() -> D27 {
    D27::from_raw(pow10_u256(54))
}

/// Protocol maximum for any price bound: 1e45 D27{nanoUSD/tok}
pub fn max_token_price() -> D27 {
    D27::from_raw(pow10_u256(45))
}

/// Basket units of a token per basket unit, D27{tok/BU}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeightRange {
    pub low: D27,
    pub spot: D27,
    pub high: D27,
}

impl WeightRange {
    pub fn new(low: D27, spot: D27, high: D27) -> Self {
        Self { low, spot, high }
    }

    /// A point range: `low == spot == high`.
    pub fn point(value: D27) -> Self {
        Self::new(value, value, value)
    }

    /// `low <= spot <= high <= 1e54`
    pub fn is_valid(&self) -> bool {
        self.low <= self.spot && self.spot <= self.high && self.high <= max_weight()
    }

    /// Clamp every bound into `[outer.low, outer.high]`.
    pub fn clamp_into(self, outer: &WeightRange) -> Self {
        Self {
            low: self.low.clamp_to(outer.low, outer.high),
            spot: self.spot.clamp_to(outer.low, outer.high),
            high: self.high.clamp_to(outer.low, outer.high),
        }
    }

    /// Whether this range sits inside `outer`.
    pub fn within(&self, outer: &WeightRange) -> bool {
        self.low >= outer.low && self.high <= outer.high
    }
}

/// Nano-USD per base unit of a token, D27{nanoUSD/tok}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceRange {
    pub low: D27,
    pub high: D27,
}

impl PriceRange {
    pub fn new(low: D27, high: D27) -> Self {
        Self { low, high }
    }

    pub fn is_valid(&self) -> bool {
        self.low <= self.high
    }

    pub fn contains(&self, price: D27) -> bool {
        self.low <= price && price <= self.high
    }

    pub fn is_point(&self) -> bool {
        self.low == self.high
    }

    pub fn clamp_into(self, outer: &PriceRange) -> Self {
        Self {
            low: self.low.clamp_to(outer.low, outer.high),
            high: self.high.clamp_to(outer.low, outer.high),
        }
    }

    pub fn within(&self, outer: &PriceRange) -> bool {
        self.low >= outer.low && self.high <= outer.high
    }
}

/// Basket units per share, D18{BU/share}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RebalanceLimits {
    pub low: D18,
    pub spot: D18,
    pub high: D18,
}

impl Default for RebalanceLimits {
    /// `{1, 1, 1}`: the BU/share ratio is fixed
    fn default() -> Self {
        Self::fixed()
    }
}

impl RebalanceLimits {
    pub fn new(low: D18, spot: D18, high: D18) -> Self {
        Self { low, spot, high }
    }

    /// `{1, 1, 1}`
    pub fn fixed() -> Self {
        Self::new(D18::ONE, D18::ONE, D18::ONE)
    }

    pub fn is_valid(&self) -> bool {
        self.low <= self.spot && self.spot <= self.high
    }

    pub fn clamp_into(self, outer: &RebalanceLimits) -> Self {
        Self {
            low: self.low.clamp_to(outer.low, outer.high),
            spot: self.spot.clamp_to(outer.low, outer.high),
            high: self.high.clamp_to(outer.low, outer.high),
        }
    }

    pub fn within(&self, outer: &RebalanceLimits) -> bool {
        self.low >= outer.low && self.high <= outer.high
    }
}
