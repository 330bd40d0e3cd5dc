//! Inclusive integer ranges rolled when generating special orders.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` integer range.
///
/// Config may spell a range as `[min, max]`, `{ "min": .., "max": .. }`, or a
/// single integer for a fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UniIntRepr", into = "UniIntRepr")]
pub struct UniInt {
    min: i32,
    max: i32,
}

impl UniInt {
    /// Range spanning `min..=max`; reversed bounds are reordered.
    #[must_use]
    pub const fn of(min: i32, max: i32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Range that always rolls `value`.
    #[must_use]
    pub const fn fixed(value: i32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    #[must_use]
    pub const fn min(self) -> i32 {
        self.min
    }

    #[must_use]
    pub const fn max(self) -> i32 {
        self.max
    }

    /// Whether every roll is non-positive, i.e. nothing can ever be generated.
    #[must_use]
    pub const fn is_degenerate(self) -> bool {
        self.max <= 0
    }

    /// Roll a value in the closed interval. Fixed ranges draw nothing from `rng`.
    pub fn roll(self, rng: &mut impl Rng) -> i32 {
        if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

impl Default for UniInt {
    fn default() -> Self {
        Self::fixed(0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum UniIntRepr {
    Fixed(i32),
    Pair([i32; 2]),
    Bounds { min: i32, max: i32 },
}

impl From<UniIntRepr> for UniInt {
    fn from(value: UniIntRepr) -> Self {
        match value {
            UniIntRepr::Fixed(v) => Self::fixed(v),
            UniIntRepr::Pair([min, max]) | UniIntRepr::Bounds { min, max } => Self::of(min, max),
        }
    }
}

impl From<UniInt> for UniIntRepr {
    fn from(value: UniInt) -> Self {
        Self::Pair([value.min, value.max])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn rolls_stay_inside_bounds() {
        let range = UniInt::of(3, 9);
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            let value = range.roll(&mut rng);
            assert!((3..=9).contains(&value));
        }
    }

    #[test]
    fn reversed_bounds_are_reordered() {
        let range = UniInt::of(10, 2);
        assert_eq!(range.min(), 2);
        assert_eq!(range.max(), 10);
    }

    #[test]
    fn degenerate_ranges_are_detected() {
        assert!(UniInt::fixed(0).is_degenerate());
        assert!(UniInt::of(-5, 0).is_degenerate());
        assert!(!UniInt::of(-5, 1).is_degenerate());
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(UniInt::fixed(0).roll(&mut rng), 0);
    }

    #[test]
    fn deserializes_every_spelling() {
        let pair: UniInt = serde_json::from_str("[1, 5]").unwrap();
        let bounds: UniInt = serde_json::from_str(r#"{"min": 5, "max": 1}"#).unwrap();
        let fixed: UniInt = serde_json::from_str("7").unwrap();
        assert_eq!(pair, UniInt::of(1, 5));
        assert_eq!(bounds, UniInt::of(1, 5));
        assert_eq!(fixed, UniInt::fixed(7));
        assert_eq!(serde_json::to_string(&pair).unwrap(), "[1,5]");
    }
}
