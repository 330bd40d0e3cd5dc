//! Job aggregate: leveling parameters, scaling modifiers and objectives.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::constants::{DEFAULT_CURRENCY, EVERY_LEVEL, JOB_PERMISSION_PREFIX, MIN_XP_FACTOR};
use crate::employees::EmployeeCounter;
use crate::level_table::LevelTable;
use crate::modifier::{Limit, Modifier};
use crate::objective::JobObjective;
use crate::special_order::SpecialOrderSettings;

/// A player's relationship to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Primary,
    Secondary,
    Inactive,
}

impl JobState {
    pub const ALL: [Self; 3] = [Self::Primary, Self::Secondary, Self::Inactive];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Inactive => 2,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Inactive => "inactive",
        }
    }

    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Scalar leveling parameters, clamped to their valid minimums.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leveling {
    pub max_level: u32,
    pub max_secondary_level: u32,
    pub initial_xp: i32,
    pub xp_factor: f64,
}

impl Leveling {
    /// Normalize raw config values: the max level and initial XP become
    /// `max(1, |x|)`, the secondary max level `max(1, x)` and the factor
    /// `max(1.0, f)`.
    #[must_use]
    pub fn normalized(max_level: i32, max_secondary_level: i32, initial_xp: i32, xp_factor: f64) -> Self {
        let positive = |value: i32| value.unsigned_abs().max(1);
        let factor = if xp_factor.is_nan() {
            MIN_XP_FACTOR
        } else {
            xp_factor.max(MIN_XP_FACTOR)
        };
        Self {
            max_level: positive(max_level),
            max_secondary_level: u32::try_from(max_secondary_level).unwrap_or(0).max(1),
            initial_xp: i32::try_from(positive(initial_xp)).unwrap_or(i32::MAX),
            xp_factor: factor,
        }
    }
}

/// Level-scaled modifiers applied to objective payouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobModifiers {
    pub payment_multiplier: Modifier,
    pub xp_multiplier: Modifier,
    /// Keyed by lowercase currency id; `"*"` is the fallback.
    pub daily_payment_limits: BTreeMap<String, Modifier>,
    pub daily_xp_limit: Modifier,
}

impl Default for JobModifiers {
    fn default() -> Self {
        Self {
            payment_multiplier: Modifier::default_payment(),
            xp_multiplier: Modifier::default_xp(),
            daily_payment_limits: BTreeMap::new(),
            daily_xp_limit: Modifier::unlimited(),
        }
    }
}

/// Descriptive fields that do not affect progression math.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobProfile {
    pub name: String,
    pub description: Vec<String>,
    pub permission_required: bool,
    pub initial_state: Option<JobState>,
    pub allowed_states: BTreeSet<JobState>,
    pub disabled_worlds: BTreeSet<String>,
}

/// A profession definition. Immutable once built apart from its employee
/// counters; reloads build a replacement.
#[derive(Debug)]
pub struct Job {
    id: String,
    profile: JobProfile,
    leveling: Leveling,
    level_table: LevelTable,
    level_up_commands: BTreeMap<u32, Vec<String>>,
    modifiers: JobModifiers,
    special_orders: SpecialOrderSettings,
    objectives: BTreeMap<String, JobObjective>,
    employees: Arc<EmployeeCounter>,
}

impl Job {
    /// Assemble a job; the level table is derived here and objectives with a
    /// duplicate id replace earlier ones.
    #[must_use]
    pub fn new(
        id: &str,
        profile: JobProfile,
        leveling: Leveling,
        level_up_commands: BTreeMap<u32, Vec<String>>,
        modifiers: JobModifiers,
        special_orders: SpecialOrderSettings,
        objectives: Vec<JobObjective>,
    ) -> Self {
        let leveling = Leveling::normalized(
            i32::try_from(leveling.max_level).unwrap_or(i32::MAX),
            i32::try_from(leveling.max_secondary_level).unwrap_or(i32::MAX),
            leveling.initial_xp,
            leveling.xp_factor,
        );
        let level_table =
            LevelTable::build(leveling.max_level, leveling.initial_xp, leveling.xp_factor);
        let mut profile = profile;
        profile.disabled_worlds = profile
            .disabled_worlds
            .iter()
            .map(|world| world.to_lowercase())
            .collect();
        let modifiers = JobModifiers {
            daily_payment_limits: modifiers
                .daily_payment_limits
                .into_iter()
                .map(|(currency, limit)| (currency.to_lowercase(), limit))
                .collect(),
            ..modifiers
        };
        let objectives = objectives
            .into_iter()
            .map(|objective| (objective.id().to_string(), objective))
            .collect();
        Self {
            id: id.trim().to_lowercase(),
            profile,
            leveling,
            level_table,
            level_up_commands,
            modifiers,
            special_orders,
            objectives,
            employees: Arc::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn profile(&self) -> &JobProfile {
        &self.profile
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    #[must_use]
    pub const fn leveling(&self) -> Leveling {
        self.leveling
    }

    #[must_use]
    pub const fn level_table(&self) -> &LevelTable {
        &self.level_table
    }

    #[must_use]
    pub const fn modifiers(&self) -> &JobModifiers {
        &self.modifiers
    }

    #[must_use]
    pub const fn special_orders(&self) -> &SpecialOrderSettings {
        &self.special_orders
    }

    #[must_use]
    pub fn employees(&self) -> &EmployeeCounter {
        &self.employees
    }

    /// Adopt the counters of the job this one replaces, so updates made
    /// through either snapshot land in the same place.
    #[must_use]
    pub(crate) fn sharing_employees_with(mut self, previous: &Self) -> Self {
        self.employees = Arc::clone(&previous.employees);
        self
    }

    #[must_use]
    pub const fn level_up_command_table(&self) -> &BTreeMap<u32, Vec<String>> {
        &self.level_up_commands
    }

    /// Permission node required when the job is permission-gated.
    #[must_use]
    pub fn permission_node(&self) -> String {
        format!("{JOB_PERMISSION_PREFIX}{}", self.id)
    }

    /// Whether a player may use this job given whether they hold its permission.
    #[must_use]
    pub const fn is_permitted(&self, has_permission: bool) -> bool {
        !self.profile.permission_required || has_permission
    }

    #[must_use]
    pub fn is_allowed_state(&self, state: JobState) -> bool {
        self.profile.allowed_states.contains(&state)
    }

    #[must_use]
    pub fn initial_state(&self) -> JobState {
        self.profile.initial_state.unwrap_or(JobState::Inactive)
    }

    #[must_use]
    pub fn is_good_world(&self, world: &str) -> bool {
        !self.profile.disabled_worlds.contains(&world.to_lowercase())
    }

    #[must_use]
    pub const fn max_level_for(&self, state: JobState) -> u32 {
        match state {
            JobState::Primary => self.leveling.max_level,
            JobState::Secondary | JobState::Inactive => self.leveling.max_secondary_level,
        }
    }

    #[must_use]
    pub fn xp_to_level(&self, level: u32) -> i32 {
        self.level_table.xp_to_level(level)
    }

    #[must_use]
    pub fn payment_multiplier(&self, level: u32) -> f64 {
        self.modifiers.payment_multiplier.value(level)
    }

    #[must_use]
    pub fn xp_multiplier(&self, level: u32) -> f64 {
        self.modifiers.xp_multiplier.value(level)
    }

    /// Daily payment cap for a currency, falling back to the `"*"` entry.
    #[must_use]
    pub fn daily_payment_limit(&self, currency: &str, level: u32) -> Limit {
        let limits = &self.modifiers.daily_payment_limits;
        limits
            .get(&currency.to_lowercase())
            .or_else(|| limits.get(DEFAULT_CURRENCY))
            .map_or(Limit::Unlimited, |modifier| modifier.limit(level))
    }

    #[must_use]
    pub fn daily_xp_limit(&self, level: u32) -> Limit {
        self.modifiers.daily_xp_limit.limit(level)
    }

    /// Commands for reaching `level`: every-level commands first, then the
    /// level-specific ones.
    #[must_use]
    pub fn level_up_commands(&self, level: u32) -> Vec<String> {
        let every = self.level_up_commands.get(&EVERY_LEVEL);
        let exact = (level != EVERY_LEVEL)
            .then(|| self.level_up_commands.get(&level))
            .flatten();
        every
            .into_iter()
            .chain(exact)
            .flatten()
            .cloned()
            .collect()
    }

    #[must_use]
    pub const fn objective_map(&self) -> &BTreeMap<String, JobObjective> {
        &self.objectives
    }

    pub fn objectives(&self) -> impl Iterator<Item = &JobObjective> {
        self.objectives.values()
    }

    #[must_use]
    pub fn objective(&self, id: &str) -> Option<&JobObjective> {
        self.objectives.get(&id.to_lowercase())
    }

    pub fn objectives_by_work<'a>(
        &'a self,
        work_id: &'a str,
    ) -> impl Iterator<Item = &'a JobObjective> + 'a {
        self.objectives
            .values()
            .filter(move |objective| objective.is_work(work_id))
    }

    /// First objective scoring an action of `work_id` on `object`.
    #[must_use]
    pub fn objective_for(&self, work_id: &str, object: &str) -> Option<&JobObjective> {
        self.objectives
            .values()
            .find(|objective| objective.is_objective(work_id, object))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::range::UniInt;

    pub(crate) fn sample_job(objectives: Vec<JobObjective>) -> Job {
        let mut commands = BTreeMap::new();
        commands.insert(0, vec!["eco give %player% 250".to_string()]);
        commands.insert(5, vec!["broadcast %player% reached 5".to_string()]);
        let mut limits = BTreeMap::new();
        limits.insert("Vault".to_string(), Modifier::add(1000.0, 100.0, 1.0));
        limits.insert("*".to_string(), Modifier::add(50.0, 0.0, 1.0));
        Job::new(
            "Miner",
            JobProfile {
                name: "Miner".to_string(),
                allowed_states: JobState::ALL.into_iter().collect(),
                disabled_worlds: BTreeSet::from(["Nether_Test".to_string()]),
                ..JobProfile::default()
            },
            Leveling::normalized(10, 4, 100, 2.0),
            commands,
            JobModifiers {
                daily_payment_limits: limits,
                ..JobModifiers::default()
            },
            SpecialOrderSettings {
                objectives_amount: UniInt::of(1, 2),
                ..SpecialOrderSettings::default()
            },
            objectives,
        )
    }

    #[test]
    fn leveling_values_are_clamped() {
        let leveling = Leveling::normalized(0, -5, -300, 0.5);
        assert_eq!(leveling.max_level, 1);
        assert_eq!(leveling.max_secondary_level, 1);
        assert_eq!(Leveling::normalized(10, 7, 100, 1.0).max_secondary_level, 7);
        assert_eq!(Leveling::normalized(-10, -5, 100, 1.0).max_level, 10);
        assert_eq!(leveling.initial_xp, 300);
        assert!((leveling.xp_factor - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn max_level_depends_on_state() {
        let job = sample_job(Vec::new());
        assert_eq!(job.max_level_for(JobState::Primary), 10);
        assert_eq!(job.max_level_for(JobState::Secondary), 4);
        assert_eq!(job.max_level_for(JobState::Inactive), 4);
    }

    #[test]
    fn xp_lookup_follows_table() {
        let job = sample_job(Vec::new());
        assert_eq!(job.xp_to_level(0), 100);
        assert_eq!(job.xp_to_level(1), 100);
        assert_eq!(job.xp_to_level(3), 400);
        assert_eq!(job.xp_to_level(99), job.xp_to_level(10));
    }

    #[test]
    fn payment_limits_fall_back_to_default_currency() {
        let job = sample_job(Vec::new());
        assert_eq!(job.daily_payment_limit("VAULT", 2), Limit::Limited(1200.0));
        assert_eq!(job.daily_payment_limit("gems", 2), Limit::Limited(50.0));
        assert_eq!(job.daily_xp_limit(7), Limit::Unlimited);
    }

    #[test]
    fn payment_limits_without_any_entry_are_unlimited() {
        let job = Job::new(
            "bare",
            JobProfile::default(),
            Leveling::normalized(1, 1, 1, 1.0),
            BTreeMap::new(),
            JobModifiers::default(),
            SpecialOrderSettings::default(),
            Vec::new(),
        );
        assert_eq!(job.daily_payment_limit("vault", 1), Limit::Unlimited);
    }

    #[test]
    fn level_up_commands_put_catch_all_first() {
        let job = sample_job(Vec::new());
        assert_eq!(
            job.level_up_commands(5),
            vec![
                "eco give %player% 250".to_string(),
                "broadcast %player% reached 5".to_string(),
            ]
        );
        assert_eq!(job.level_up_commands(3).len(), 1);
    }

    #[test]
    fn worlds_and_states_are_checked() {
        let job = sample_job(Vec::new());
        assert!(!job.is_good_world("nether_test"));
        assert!(job.is_good_world("overworld"));
        assert!(job.is_allowed_state(JobState::Secondary));
        assert_eq!(job.permission_node(), "jobcraft.job.miner");
        assert!(job.is_permitted(false));
    }

    #[test]
    fn objectives_are_found_case_insensitively() {
        let job = sample_job(vec![
            JobObjective::new("Ores", "block_break", ["iron_ore"]),
            JobObjective::new("fish", "fishing", ["*"]),
        ]);
        assert!(job.objective("ORES").is_some());
        assert_eq!(
            job.objective_for("FISHING", "salmon").map(JobObjective::id),
            Some("fish")
        );
        assert_eq!(job.objectives_by_work("block_break").count(), 1);
    }
}
