//! Special orders: timed contracts sampled from a job's objectives.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

use crate::config::EngineSettings;
use crate::constants::{
    DEFAULT_ORDER_COST, DEFAULT_ORDER_COST_CURRENCY, DEFAULT_ORDER_DURATION_SECS,
    DEFAULT_ORDER_OBJECTIVES, DEFAULT_ORDER_REWARDS, MILLIS_PER_SECOND, WILDCARD,
};
use crate::job::Job;
use crate::numbers::pick_index;
use crate::objective::JobObjective;
use crate::range::UniInt;
use crate::services::CurrencyService;

/// Reward names attached to an order; most orders carry a handful.
pub type RewardList = SmallVec<[String; 4]>;

/// Per-job special-order configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialOrderSettings {
    #[serde(default = "SpecialOrderSettings::default_enabled")]
    pub enabled: bool,
    #[serde(default = "SpecialOrderSettings::default_objectives_amount")]
    pub objectives_amount: UniInt,
    /// Completion window in seconds.
    #[serde(default = "SpecialOrderSettings::default_duration_secs")]
    pub duration_secs: UniInt,
    #[serde(default = "SpecialOrderSettings::default_rewards_amount")]
    pub rewards_amount: UniInt,
    /// Reward names unlocked at a minimum job level; `"*"` means every
    /// globally configured reward.
    #[serde(default = "SpecialOrderSettings::default_allowed_rewards")]
    pub allowed_rewards: BTreeMap<u32, Vec<String>>,
    /// Entry cost per lowercase currency id.
    #[serde(default = "SpecialOrderSettings::default_cost")]
    pub cost: BTreeMap<String, f64>,
}

impl SpecialOrderSettings {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_objectives_amount() -> UniInt {
        UniInt::of(DEFAULT_ORDER_OBJECTIVES.0, DEFAULT_ORDER_OBJECTIVES.1)
    }

    const fn default_duration_secs() -> UniInt {
        UniInt::of(DEFAULT_ORDER_DURATION_SECS.0, DEFAULT_ORDER_DURATION_SECS.1)
    }

    const fn default_rewards_amount() -> UniInt {
        UniInt::of(DEFAULT_ORDER_REWARDS.0, DEFAULT_ORDER_REWARDS.1)
    }

    fn default_allowed_rewards() -> BTreeMap<u32, Vec<String>> {
        BTreeMap::from([(1, vec![WILDCARD.to_string()])])
    }

    fn default_cost() -> BTreeMap<String, f64> {
        BTreeMap::from([(DEFAULT_ORDER_COST_CURRENCY.to_string(), DEFAULT_ORDER_COST)])
    }

    /// Reward names configured for the greatest level key not above `level`.
    /// Job levels start at 1, so level 0 resolves like level 1.
    #[must_use]
    pub fn rewards_for_level(&self, level: u32) -> &[String] {
        self.allowed_rewards
            .range(..=level.max(1))
            .next_back()
            .map(|(_, names)| names.as_slice())
            .unwrap_or_default()
    }
}

impl Default for SpecialOrderSettings {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            objectives_amount: Self::default_objectives_amount(),
            duration_secs: Self::default_duration_secs(),
            rewards_amount: Self::default_rewards_amount(),
            allowed_rewards: Self::default_allowed_rewards(),
            cost: Self::default_cost(),
        }
    }
}

/// Required and completed amounts for one object within an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCount {
    pub required: u32,
    #[serde(default)]
    pub completed: u32,
}

impl OrderCount {
    #[must_use]
    pub const fn new(required: u32) -> Self {
        Self {
            required,
            completed: 0,
        }
    }

    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.completed >= self.required
    }
}

/// Object requirements for one objective within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderObjective {
    pub objective_id: String,
    pub counts: BTreeMap<String, OrderCount>,
}

impl OrderObjective {
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.counts.values().all(OrderCount::is_done)
    }
}

/// A generated contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialOrder {
    pub objectives: BTreeMap<String, OrderObjective>,
    pub rewards: RewardList,
    pub completed: bool,
    /// Epoch milliseconds.
    pub expire_at: i64,
}

impl SpecialOrder {
    #[must_use]
    pub const fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expire_at
    }

    /// Whether every object count has reached its requirement.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.objectives.values().all(OrderObjective::is_done)
    }

    /// Record progress for an object; returns the updated count when the
    /// object is part of the order and still incomplete.
    pub fn add_progress(&mut self, objective_id: &str, object: &str, amount: u32) -> Option<OrderCount> {
        if self.completed {
            return None;
        }
        let count = self
            .objectives
            .get_mut(&objective_id.to_lowercase())?
            .counts
            .get_mut(&object.to_lowercase())?;
        if count.is_done() {
            return None;
        }
        count.completed = count.completed.saturating_add(amount).min(count.required);
        Some(*count)
    }

    /// Flag the order complete once every count is met.
    pub fn try_complete(&mut self) -> bool {
        if !self.completed && self.is_ready() {
            self.completed = true;
        }
        self.completed
    }
}

impl Job {
    /// Generate a special order for a player at `player_level`.
    ///
    /// Returns `None` whenever no order can be assembled: the feature is
    /// disabled, a range rolls non-positive, or no objective yields objects.
    /// Objectives and objects are drawn without replacement, so the loops end
    /// once the candidate lists run dry.
    pub fn create_special_order(
        &self,
        settings: &EngineSettings,
        player_level: u32,
        now_ms: i64,
        rng: &mut impl Rng,
    ) -> Option<SpecialOrder> {
        let cfg = self.special_orders();
        if !settings.special_orders_enabled || !cfg.enabled {
            log::debug!("special orders disabled for job '{}'", self.id());
            return None;
        }

        let duration = cfg.duration_secs.roll(rng);
        if duration <= 0 {
            return None;
        }
        let mut objectives_left = cfg.objectives_amount.roll(rng);
        if objectives_left <= 0 {
            return None;
        }

        let mut candidates: Vec<&JobObjective> = self.objectives().collect();
        let mut objectives = BTreeMap::new();
        while objectives_left > 0 && !candidates.is_empty() {
            let objective = candidates.swap_remove(pick_index(rng, candidates.len()));
            if !objective.is_special_order_allowed() {
                continue;
            }
            let Some(counts) = roll_object_counts(objective, rng) else {
                continue;
            };
            objectives.insert(
                objective.id().to_string(),
                OrderObjective {
                    objective_id: objective.id().to_string(),
                    counts,
                },
            );
            objectives_left -= 1;
        }
        if objectives.is_empty() {
            log::debug!("no eligible objectives for special order in job '{}'", self.id());
            return None;
        }

        let rewards = roll_rewards(cfg, settings, player_level, rng);
        let expire_at =
            now_ms.saturating_add(i64::from(duration).saturating_mul(MILLIS_PER_SECOND));

        Some(SpecialOrder {
            objectives,
            rewards,
            completed: false,
            expire_at,
        })
    }

    /// Whether the player can pay every configured entry cost. Currencies the
    /// service does not know are skipped.
    pub fn can_afford_special_order<C: CurrencyService>(&self, player: &str, currencies: &C) -> bool {
        self.special_orders().cost.iter().all(|(currency, amount)| {
            currencies
                .balance(player, currency)
                .is_none_or(|balance| balance >= *amount)
        })
    }

    /// Take every configured entry cost from the player. Every balance is
    /// checked before anything is taken, so a short player keeps all funds
    /// and gets `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns the currency service's error for the first failed debit.
    pub fn charge_special_order<C: CurrencyService>(
        &self,
        player: &str,
        currencies: &C,
    ) -> Result<bool, C::Error> {
        if !self.can_afford_special_order(player, currencies) {
            return Ok(false);
        }
        for (currency, amount) in &self.special_orders().cost {
            if currencies.balance(player, currency).is_none() {
                log::debug!("skipping unknown currency '{currency}' for special order cost");
                continue;
            }
            currencies.take(player, currency, *amount)?;
        }
        Ok(true)
    }
}

fn roll_object_counts(
    objective: &JobObjective,
    rng: &mut impl Rng,
) -> Option<BTreeMap<String, OrderCount>> {
    let mut objects_left = objective.special_order_objects_amount().roll(rng);
    if objects_left <= 0 {
        return None;
    }
    let mut objects: Vec<&String> = objective.objects().iter().collect();
    let mut counts = BTreeMap::new();
    while objects_left > 0 && !objects.is_empty() {
        let object = objects.swap_remove(pick_index(rng, objects.len()));
        let required = objective.special_order_object_count().roll(rng);
        let Ok(required) = u32::try_from(required) else {
            continue;
        };
        if required == 0 {
            continue;
        }
        counts.insert(object.to_lowercase(), OrderCount::new(required));
        objects_left -= 1;
    }
    (!counts.is_empty()).then_some(counts)
}

fn roll_rewards(
    cfg: &SpecialOrderSettings,
    settings: &EngineSettings,
    player_level: u32,
    rng: &mut impl Rng,
) -> RewardList {
    let configured = cfg.rewards_for_level(player_level);
    let mut pool: Vec<&str> = if configured.iter().any(|name| name == WILDCARD) {
        settings.rewards.keys().map(String::as_str).collect()
    } else {
        configured.iter().map(String::as_str).collect()
    };

    let mut rewards_left = cfg.rewards_amount.roll(rng);
    let mut rewards = RewardList::new();
    while rewards_left > 0 && !pool.is_empty() {
        let name = pool.swap_remove(pick_index(rng, pool.len()));
        rewards.push(name.to_string());
        rewards_left -= 1;
    }
    rewards
}
