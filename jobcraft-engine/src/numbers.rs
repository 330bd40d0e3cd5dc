//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn floor_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).floor();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Floor a f64 and clamp it to the u32 range, returning 0 for NaN values.
#[must_use]
pub fn floor_f64_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.clamp(0.0, f64::from(u32::MAX)).floor();
    cast::<f64, u32>(clamped).unwrap_or(0)
}

/// Convert a possibly negative config level into a non-negative level.
#[must_use]
pub fn level_from_i32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Pick an index uniformly from `0..len`; `len` must be non-zero.
pub(crate) fn pick_index(rng: &mut impl rand::Rng, len: usize) -> usize {
    rng.gen_range(0..len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_truncates_and_saturates() {
        assert_eq!(floor_f64_to_i32(1093.9), 1093);
        assert_eq!(floor_f64_to_i32(f64::NAN), 0);
        assert_eq!(floor_f64_to_i32(f64::from(i32::MAX) * 3.0), i32::MAX);
    }

    #[test]
    fn unsigned_floor_clamps_negatives() {
        assert_eq!(floor_f64_to_u32(-4.2), 0);
        assert_eq!(floor_f64_to_u32(12.7), 12);
    }

    #[test]
    fn negative_levels_collapse_to_zero() {
        assert_eq!(level_from_i32(-3), 0);
        assert_eq!(level_from_i32(7), 7);
    }
}
