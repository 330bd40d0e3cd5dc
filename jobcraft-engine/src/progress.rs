//! Per-player job progress: XP gain, level ups, daily caps and the active
//! special order.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::EngineSettings;
use crate::job::{Job, JobState};
use crate::numbers::floor_f64_to_i32;
use crate::objective::JobObjective;
use crate::services::CurrencyService;
use crate::special_order::SpecialOrder;

/// Result of feeding XP into a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpGain {
    /// XP actually added after multipliers and the daily cap.
    pub applied: i32,
    /// Each level reached, in order.
    pub levels_reached: Vec<u32>,
    /// Level-up commands for every level reached, in order.
    pub commands: Vec<String>,
}

impl XpGain {
    #[must_use]
    pub fn leveled_up(&self) -> bool {
        !self.levels_reached.is_empty()
    }
}

/// Outcome of asking for a new special order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderRequest {
    Created,
    AlreadyActive,
    Unaffordable,
    Unavailable,
}

/// A player's standing in one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    pub state: JobState,
    pub level: u32,
    pub xp: i32,
    /// XP earned since the last daily reset.
    #[serde(default)]
    pub daily_xp: f64,
    /// Currency earned since the last daily reset, keyed by currency id.
    #[serde(default)]
    pub daily_payments: BTreeMap<String, f64>,
    #[serde(default)]
    pub special_order: Option<SpecialOrder>,
}

impl JobProgress {
    /// Fresh progress in the job's initial state.
    #[must_use]
    pub fn new(job: &Job) -> Self {
        Self {
            state: job.initial_state(),
            level: 1,
            xp: 0,
            daily_xp: 0.0,
            daily_payments: BTreeMap::new(),
            special_order: None,
        }
    }

    #[must_use]
    pub fn xp_to_next(&self, job: &Job) -> i32 {
        job.xp_to_level(self.level)
    }

    #[must_use]
    pub fn is_max_level(&self, job: &Job) -> bool {
        self.level >= job.max_level_for(self.state)
    }

    pub fn reset_daily(&mut self) {
        self.daily_xp = 0.0;
        self.daily_payments.clear();
    }

    /// Add XP scaled by the job's XP multiplier and bounded by its daily cap,
    /// leveling up through the level table. Inactive jobs gain nothing.
    pub fn gain_xp(&mut self, job: &Job, base_xp: f64) -> XpGain {
        if !self.state.is_active() || base_xp <= 0.0 {
            return XpGain::default();
        }
        let scaled = base_xp * job.xp_multiplier(self.level);
        let allowed = job.daily_xp_limit(self.level).clamp_gain(self.daily_xp, scaled);
        let applied = floor_f64_to_i32(allowed);
        if applied <= 0 {
            return XpGain::default();
        }

        self.daily_xp += f64::from(applied);
        self.xp = self.xp.saturating_add(applied);

        let max_level = job.max_level_for(self.state);
        let mut gain = XpGain {
            applied,
            ..XpGain::default()
        };
        while self.level < max_level && self.xp >= job.xp_to_level(self.level) {
            self.xp -= job.xp_to_level(self.level);
            self.level += 1;
            gain.levels_reached.push(self.level);
            gain.commands.extend(job.level_up_commands(self.level));
        }
        if self.level >= max_level {
            self.xp = self.xp.min(job.xp_to_level(self.level));
        }
        gain
    }

    /// Roll an objective's payment for `currency`, scaled by the income
    /// multiplier and bounded by the daily payment cap.
    pub fn earn_payment(
        &mut self,
        job: &Job,
        objective: &JobObjective,
        currency: &str,
        rng: &mut impl Rng,
    ) -> Option<f64> {
        if !self.state.is_active() || !objective.is_unlocked(self.level) {
            return None;
        }
        let rolled = objective.payment_info(currency).roll(rng)?;
        let scaled = rolled * job.payment_multiplier(self.level);
        let currency = currency.to_lowercase();
        let earned = self.daily_payments.get(&currency).copied().unwrap_or(0.0);
        let amount = job
            .daily_payment_limit(&currency, self.level)
            .clamp_gain(earned, scaled);
        if amount <= 0.0 {
            return None;
        }
        *self.daily_payments.entry(currency).or_insert(0.0) += amount;
        Some(amount)
    }

    /// Whether the player holds an order that is neither completed nor expired.
    #[must_use]
    pub fn has_active_order(&self, now_ms: i64) -> bool {
        self.special_order
            .as_ref()
            .is_some_and(|order| !order.completed && !order.is_expired(now_ms))
    }

    /// Charge the entry cost and assign a freshly generated order.
    ///
    /// Nothing is charged when generation yields no order.
    ///
    /// # Errors
    ///
    /// Returns the currency service's error if charging fails.
    pub fn request_special_order<C: CurrencyService>(
        &mut self,
        job: &Job,
        settings: &EngineSettings,
        player: &str,
        currencies: &C,
        now_ms: i64,
        rng: &mut impl Rng,
    ) -> Result<OrderRequest, C::Error> {
        if self.has_active_order(now_ms) {
            return Ok(OrderRequest::AlreadyActive);
        }
        if !job.can_afford_special_order(player, currencies) {
            return Ok(OrderRequest::Unaffordable);
        }
        let Some(order) = job.create_special_order(settings, self.level, now_ms, rng) else {
            return Ok(OrderRequest::Unavailable);
        };
        if !job.charge_special_order(player, currencies)? {
            return Ok(OrderRequest::Unaffordable);
        }
        self.special_order = Some(order);
        Ok(OrderRequest::Created)
    }
}
