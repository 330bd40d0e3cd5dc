//! Scorable job objectives and their payment descriptors.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::constants::{
    DEFAULT_OBJECTIVE_OBJECT_COUNT, DEFAULT_OBJECTIVE_OBJECTS_AMOUNT, DEFAULT_UNLOCK_LEVEL,
    FULL_CHANCE, WILDCARD,
};
use crate::numbers::level_from_i32;
use crate::range::UniInt;

/// Chance-gated amount paid out when an objective is performed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveReward {
    /// Percent chance (0-100) that the reward is granted at all.
    #[serde(default = "ObjectiveReward::default_chance")]
    pub chance: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

impl ObjectiveReward {
    /// Sentinel for "pays nothing".
    pub const EMPTY: Self = Self {
        chance: 0.0,
        min: 0.0,
        max: 0.0,
    };

    const fn default_chance() -> f64 {
        FULL_CHANCE
    }

    #[must_use]
    pub const fn new(chance: f64, min: f64, max: f64) -> Self {
        Self { chance, min, max }
    }

    /// Always-granted reward in `min..=max`.
    #[must_use]
    pub const fn guaranteed(min: f64, max: f64) -> Self {
        Self::new(FULL_CHANCE, min, max)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chance <= 0.0 || (self.min <= 0.0 && self.max <= 0.0)
    }

    /// Roll the chance and then the amount; `None` when nothing is granted.
    pub fn roll(&self, rng: &mut impl Rng) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        if self.chance < FULL_CHANCE && rng.r#gen::<f64>() * FULL_CHANCE >= self.chance {
            return None;
        }
        let (low, high) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        let amount = if (high - low).abs() < f64::EPSILON {
            low
        } else {
            rng.gen_range(low..=high)
        };
        Some(amount)
    }
}

impl Default for ObjectiveReward {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A single scorable action within a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobObjective {
    id: String,
    work_id: String,
    display_name: String,
    objects: BTreeSet<String>,
    payment: BTreeMap<String, ObjectiveReward>,
    xp_reward: ObjectiveReward,
    unlock_level: u32,
    special_order_allowed: bool,
    special_order_objects_amount: UniInt,
    special_order_object_count: UniInt,
}

impl JobObjective {
    /// Create an objective with default rewards and special-order ranges.
    ///
    /// Ids, currency keys and object names are stored lowercase.
    pub fn new<I, S>(id: &str, work_id: &str, objects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (amount_min, amount_max) = DEFAULT_OBJECTIVE_OBJECTS_AMOUNT;
        let (count_min, count_max) = DEFAULT_OBJECTIVE_OBJECT_COUNT;
        Self {
            id: id.trim().to_lowercase(),
            work_id: work_id.trim().to_string(),
            display_name: id.trim().to_string(),
            objects: objects
                .into_iter()
                .map(|object| object.as_ref().trim().to_lowercase())
                .filter(|object| !object.is_empty())
                .collect(),
            payment: BTreeMap::new(),
            xp_reward: ObjectiveReward::EMPTY,
            unlock_level: level_from_i32(DEFAULT_UNLOCK_LEVEL),
            special_order_allowed: true,
            special_order_objects_amount: UniInt::of(amount_min, amount_max),
            special_order_object_count: UniInt::of(count_min, count_max),
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = name.to_string();
        self
    }

    #[must_use]
    pub fn with_payment(mut self, currency: &str, reward: ObjectiveReward) -> Self {
        self.payment.insert(currency.trim().to_lowercase(), reward);
        self
    }

    #[must_use]
    pub fn with_xp_reward(mut self, reward: ObjectiveReward) -> Self {
        self.xp_reward = reward;
        self
    }

    #[must_use]
    pub fn with_unlock_level(mut self, level: u32) -> Self {
        self.unlock_level = level;
        self
    }

    /// Special-order eligibility, per-order object amount and per-object
    /// required count.
    #[must_use]
    pub fn with_special_order(
        mut self,
        allowed: bool,
        objects_amount: UniInt,
        object_count: UniInt,
    ) -> Self {
        self.special_order_allowed = allowed;
        self.special_order_objects_amount = objects_amount;
        self.special_order_object_count = object_count;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn work_id(&self) -> &str {
        &self.work_id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub const fn objects(&self) -> &BTreeSet<String> {
        &self.objects
    }

    #[must_use]
    pub const fn payment_map(&self) -> &BTreeMap<String, ObjectiveReward> {
        &self.payment
    }

    #[must_use]
    pub const fn xp_reward(&self) -> &ObjectiveReward {
        &self.xp_reward
    }

    #[must_use]
    pub const fn unlock_level(&self) -> u32 {
        self.unlock_level
    }

    #[must_use]
    pub const fn is_special_order_allowed(&self) -> bool {
        self.special_order_allowed
    }

    #[must_use]
    pub const fn special_order_objects_amount(&self) -> UniInt {
        self.special_order_objects_amount
    }

    #[must_use]
    pub const fn special_order_object_count(&self) -> UniInt {
        self.special_order_object_count
    }

    #[must_use]
    pub const fn is_unlocked(&self, level: u32) -> bool {
        level >= self.unlock_level
    }

    /// Unlock check that a permission collaborator may waive.
    #[must_use]
    pub const fn is_unlocked_with_bypass(&self, level: u32, bypass: bool) -> bool {
        bypass || self.is_unlocked(level)
    }

    #[must_use]
    pub fn has_object(&self, name: &str) -> bool {
        self.objects.contains(WILDCARD) || self.objects.contains(&name.to_lowercase())
    }

    #[must_use]
    pub fn is_work(&self, work_id: &str) -> bool {
        self.work_id.eq_ignore_ascii_case(work_id)
    }

    /// Whether an action of `work_id` on `object` scores for this objective.
    #[must_use]
    pub fn is_objective(&self, work_id: &str, object: &str) -> bool {
        self.is_work(work_id) && self.has_object(object)
    }

    /// Reward for `currency`, or [`ObjectiveReward::EMPTY`] when none is set.
    #[must_use]
    pub fn payment_info(&self, currency: &str) -> &ObjectiveReward {
        self.payment
            .get(&currency.to_lowercase())
            .unwrap_or(&ObjectiveReward::EMPTY)
    }

    #[must_use]
    pub fn can_pay(&self) -> bool {
        self.payment.values().any(|reward| !reward.is_empty())
    }
}
