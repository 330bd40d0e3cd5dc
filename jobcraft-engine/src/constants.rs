//! Centralized defaults and tuning constants for job progression.
//!
//! Config files may override every value here; these are the fallbacks used
//! when a field is omitted and the floors applied when a field is invalid.

// Keys ---------------------------------------------------------------------
/// Marker matching any object, or every globally configured reward.
pub const WILDCARD: &str = "*";
/// Currency key used as the fallback for per-currency daily limits.
pub const DEFAULT_CURRENCY: &str = "*";
/// Level-up command key that applies on every level.
pub const EVERY_LEVEL: u32 = 0;
/// Prefix of the permission node guarding a job.
pub const JOB_PERMISSION_PREFIX: &str = "jobcraft.job.";

// Leveling -----------------------------------------------------------------
pub(crate) const DEFAULT_MAX_LEVEL: i32 = 100;
pub(crate) const DEFAULT_MAX_SECONDARY_LEVEL: i32 = 30;
pub(crate) const DEFAULT_INITIAL_XP: i32 = 1_000;
pub(crate) const DEFAULT_XP_FACTOR: f64 = 1.093;
pub(crate) const MIN_XP_FACTOR: f64 = 1.0;

// Modifiers ----------------------------------------------------------------
pub(crate) const DEFAULT_MULTIPLIER_BASE: f64 = 1.0;
pub(crate) const DEFAULT_MULTIPLIER_PER_LEVEL: f64 = 0.01;
pub(crate) const DEFAULT_MULTIPLIER_STEP: f64 = 1.0;

// Special orders -----------------------------------------------------------
pub(crate) const DEFAULT_ORDER_OBJECTIVES: (i32, i32) = (1, 2);
pub(crate) const DEFAULT_ORDER_DURATION_SECS: (i32, i32) = (14_400, 43_200);
pub(crate) const DEFAULT_ORDER_REWARDS: (i32, i32) = (1, 3);
pub(crate) const DEFAULT_ORDER_COST_CURRENCY: &str = "vault";
pub(crate) const DEFAULT_ORDER_COST: f64 = 5_000.0;
pub(crate) const DEFAULT_OBJECTIVE_OBJECTS_AMOUNT: (i32, i32) = (1, 5);
pub(crate) const DEFAULT_OBJECTIVE_OBJECT_COUNT: (i32, i32) = (100, 500);
pub(crate) const DEFAULT_UNLOCK_LEVEL: i32 = 1;
pub(crate) const MILLIS_PER_SECOND: i64 = 1_000;

// Objective rewards --------------------------------------------------------
pub(crate) const FULL_CHANCE: f64 = 100.0;
