//! Level-scaled modifiers for income, XP gain and daily limits.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MULTIPLIER_BASE, DEFAULT_MULTIPLIER_PER_LEVEL, DEFAULT_MULTIPLIER_STEP,
};
use crate::numbers::floor_f64_to_u32;

/// How the per-level term combines with the base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierAction {
    /// `base + per_level * steps`
    #[default]
    Add,
    /// `base * per_level ^ steps`
    Multiply,
}

/// Pure function from a job level to a numeric value.
///
/// `steps` is `floor(level / step)` when `step > 0`, otherwise the level
/// itself. A positive `cap` bounds the result from above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub base: f64,
    #[serde(default)]
    pub per_level: f64,
    #[serde(default = "Modifier::default_step")]
    pub step: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<f64>,
    #[serde(default)]
    pub action: ModifierAction,
}

impl Modifier {
    const fn default_step() -> f64 {
        DEFAULT_MULTIPLIER_STEP
    }

    #[must_use]
    pub const fn add(base: f64, per_level: f64, step: f64) -> Self {
        Self {
            base,
            per_level,
            step,
            cap: None,
            action: ModifierAction::Add,
        }
    }

    #[must_use]
    pub const fn multiply(base: f64, per_level: f64, step: f64) -> Self {
        Self {
            base,
            per_level,
            step,
            cap: None,
            action: ModifierAction::Multiply,
        }
    }

    /// Bound the result from above.
    #[must_use]
    pub const fn with_cap(mut self, cap: f64) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Limit encoding that never caps anything.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self::add(-1.0, 0.0, 0.0)
    }

    /// Default income multiplier: +1% per level.
    #[must_use]
    pub const fn default_payment() -> Self {
        Self::add(
            DEFAULT_MULTIPLIER_BASE,
            DEFAULT_MULTIPLIER_PER_LEVEL,
            DEFAULT_MULTIPLIER_STEP,
        )
    }

    /// Default XP multiplier: +1% per level.
    #[must_use]
    pub const fn default_xp() -> Self {
        Self::add(
            DEFAULT_MULTIPLIER_BASE,
            DEFAULT_MULTIPLIER_PER_LEVEL,
            DEFAULT_MULTIPLIER_STEP,
        )
    }

    fn steps(&self, level: u32) -> u32 {
        if self.step > 0.0 {
            floor_f64_to_u32(f64::from(level) / self.step)
        } else {
            level
        }
    }

    /// Evaluate the modifier at `level`.
    #[must_use]
    pub fn value(&self, level: u32) -> f64 {
        let steps = self.steps(level);
        let raw = match self.action {
            ModifierAction::Add => self.base + self.per_level * f64::from(steps),
            ModifierAction::Multiply => {
                let exponent = i32::try_from(steps).unwrap_or(i32::MAX);
                self.base * self.per_level.powi(exponent)
            }
        };
        match self.cap {
            Some(cap) if cap > 0.0 => raw.min(cap),
            _ => raw,
        }
    }

    /// Evaluate the modifier as a limit; non-positive values mean no limit.
    #[must_use]
    pub fn limit(&self, level: u32) -> Limit {
        Limit::from_value(self.value(level))
    }
}

/// Daily cap resolved for a level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    Unlimited,
    Limited(f64),
}

impl Limit {
    #[must_use]
    pub fn from_value(value: f64) -> Self {
        if value > 0.0 {
            Self::Limited(value)
        } else {
            Self::Unlimited
        }
    }

    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Amount still allowed after `used` has been earned; `None` when unlimited.
    #[must_use]
    pub fn remaining(self, used: f64) -> Option<f64> {
        match self {
            Self::Unlimited => None,
            Self::Limited(cap) => Some((cap - used).max(0.0)),
        }
    }

    /// Whether the cap has been reached.
    #[must_use]
    pub fn is_reached(self, used: f64) -> bool {
        self.remaining(used).is_some_and(|left| left <= 0.0)
    }

    /// Clamp a gain so that `used + gain` stays within the cap.
    #[must_use]
    pub fn clamp_gain(self, used: f64, gain: f64) -> f64 {
        self.remaining(used).map_or(gain, |left| gain.min(left))
    }
}
