//! Per-field sanity bounds. A value outside its bound is extraction noise and
//! is dropped, never clamped.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    pub min: u32,
    /// Exclusive.
    pub max: u32,
}

impl Bound {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(self, value: u32) -> bool {
        value >= self.min && value < self.max
    }

    #[must_use]
    pub fn accept(self, value: u32) -> Option<u32> {
        self.contains(value).then_some(value)
    }
}

pub const ANNUAL_COST: Bound = Bound::new(0, 10_000);
pub const WELCOME_VALUE_Y1: Bound = Bound::new(0, 1_000_000);
pub const WELCOME_VALUE_Y2: Bound = Bound::new(0, 100_000);
pub const MIN_SPEND: Bound = Bound::new(0, 10_000_000);
pub const TRAVEL_CREDIT: Bound = Bound::new(0, 10_000);
pub const WELCOME_POINTS: Bound = Bound::new(1, 10_000_000);
pub const DOLLAR_VALUE: Bound = Bound::new(0, 1_000_000);

pub const TIER_POINTS: Bound = Bound::new(1, 10_000_000);
pub const TIER_SPEND: Bound = Bound::new(0, 10_000_000);
pub const TIER_MONTHS: Bound = Bound::new(1, 61);

/// Minimum-spend amounts quoted next to welcome-bonus language.
pub const BONUS_LINE_SPEND: Bound = Bound::new(1_000, 1_000_000);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_bound_is_exclusive() {
        assert_eq!(ANNUAL_COST.accept(9_999), Some(9_999));
        assert_eq!(ANNUAL_COST.accept(10_000), None);
    }

    #[test]
    fn lower_bound_is_inclusive() {
        assert_eq!(ANNUAL_COST.accept(0), Some(0));
        assert_eq!(BONUS_LINE_SPEND.accept(999), None);
        assert_eq!(BONUS_LINE_SPEND.accept(1_000), Some(1_000));
    }
}
