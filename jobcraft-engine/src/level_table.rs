//! XP curve: XP required to advance past each level.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::numbers::floor_f64_to_i32;

/// Precomputed level → XP-required table.
///
/// Each entry is the previous one multiplied by the factor and truncated, so
/// rounding compounds from level to level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTable {
    initial_xp: i32,
    entries: BTreeMap<u32, i32>,
}

impl LevelTable {
    /// Build entries for levels `1..=max_level`.
    ///
    /// Callers pass already-normalized inputs (`max_level >= 1`,
    /// `initial_xp >= 1`, `xp_factor >= 1.0`).
    #[must_use]
    pub fn build(max_level: u32, initial_xp: i32, xp_factor: f64) -> Self {
        let mut entries = BTreeMap::new();
        let mut previous = initial_xp;
        for level in 1..=max_level {
            let required = if level == 1 {
                initial_xp
            } else {
                floor_f64_to_i32(f64::from(previous) * xp_factor)
            };
            entries.insert(level, required);
            previous = required;
        }
        Self {
            initial_xp,
            entries,
        }
    }

    /// XP required at `level`, using the greatest configured level not above it.
    #[must_use]
    pub fn xp_to_level(&self, level: u32) -> i32 {
        self.entries
            .range(..=level)
            .next_back()
            .map_or(self.initial_xp, |(_, xp)| *xp)
    }

    #[must_use]
    pub fn max_level(&self) -> u32 {
        self.entries.keys().next_back().copied().unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.entries.iter().map(|(level, xp)| (*level, *xp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recurrence_truncates_each_step() {
        let table = LevelTable::build(4, 1000, 1.093);
        let values: Vec<i32> = table.iter().map(|(_, xp)| xp).collect();
        // 1093 * 1.093 = 1194.649, 1194 * 1.093 = 1305.042
        assert_eq!(values, vec![1000, 1093, 1194, 1305]);
    }

    #[test]
    fn table_is_non_decreasing() {
        for factor in [1.0, 1.01, 1.5, 2.75] {
            let table = LevelTable::build(60, 7, factor);
            let values: Vec<i32> = table.iter().map(|(_, xp)| xp).collect();
            assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
            assert_eq!(values[0], 7);
        }
    }

    #[test]
    fn lookup_uses_floor_semantics() {
        let table = LevelTable::build(3, 100, 2.0);
        assert_eq!(table.xp_to_level(0), 100);
        assert_eq!(table.xp_to_level(2), 200);
        assert_eq!(table.xp_to_level(5), 400);
        assert_eq!(table.max_level(), 3);
    }

    #[test]
    fn factor_of_one_keeps_curve_flat() {
        let table = LevelTable::build(10, 250, 1.0);
        assert!(table.iter().all(|(_, xp)| xp == 250));
        assert_eq!(table.len(), 10);
    }
}
