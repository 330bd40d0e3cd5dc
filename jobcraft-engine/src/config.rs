//! Serde configuration for jobs and global engine settings.
//!
//! Field defaults mirror a freshly generated job file. Loading normalizes
//! out-of-range values instead of rejecting them, and drops objectives whose
//! work type is unknown.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::constants::{
    DEFAULT_INITIAL_XP, DEFAULT_MAX_LEVEL, DEFAULT_MAX_SECONDARY_LEVEL,
    DEFAULT_OBJECTIVE_OBJECT_COUNT, DEFAULT_OBJECTIVE_OBJECTS_AMOUNT, DEFAULT_ORDER_COST_CURRENCY,
    DEFAULT_UNLOCK_LEVEL, DEFAULT_XP_FACTOR, EVERY_LEVEL, WILDCARD,
};
use crate::job::{Job, JobModifiers, JobProfile, JobState, Leveling};
use crate::modifier::Modifier;
use crate::numbers::level_from_i32;
use crate::objective::{JobObjective, ObjectiveReward};
use crate::range::UniInt;
use crate::services::WorkRegistry;
use crate::special_order::SpecialOrderSettings;

const SAMPLE_JOB_DATA: &str = include_str!("../assets/data/jobs/miner.json");
const SAMPLE_SETTINGS_DATA: &str = include_str!("../assets/data/settings.json");

/// Errors raised while reading job configuration.
#[derive(Debug, Error)]
pub enum JobConfigError {
    #[error("failed to parse config for job '{job}': {source}")]
    Parse {
        job: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse engine settings: {0}")]
    Settings(#[source] serde_json::Error),
    #[error("invalid job id '{0}' (expected lowercase letters, digits, '_' or '-')")]
    InvalidId(String),
}

/// A reward that can be attached to special orders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderReward {
    #[serde(default)]
    pub name: String,
    /// Commands run when the reward is granted.
    #[serde(default)]
    pub commands: Vec<String>,
}

/// Global settings shared by every job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default = "EngineSettings::default_enabled")]
    pub special_orders_enabled: bool,
    /// Every special-order reward, keyed by name.
    #[serde(default)]
    pub rewards: BTreeMap<String, OrderReward>,
}

impl EngineSettings {
    const fn default_enabled() -> bool {
        true
    }

    /// Parse settings from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, JobConfigError> {
        serde_json::from_str(json).map_err(JobConfigError::Settings)
    }

    /// Bundled settings shipped with the engine.
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(SAMPLE_SETTINGS_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn reward(&self, name: &str) -> Option<&OrderReward> {
        self.rewards.get(name)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            special_orders_enabled: Self::default_enabled(),
            rewards: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelingConfig {
    #[serde(default = "LevelingConfig::default_max_level")]
    pub max_level: i32,
    #[serde(default = "LevelingConfig::default_max_secondary_level")]
    pub max_secondary_level: i32,
    #[serde(default = "LevelingConfig::default_xp_initial")]
    pub xp_initial: i32,
    #[serde(default = "LevelingConfig::default_xp_factor")]
    pub xp_factor: f64,
    /// Key `0` runs on every level up.
    #[serde(default = "LevelingConfig::default_levelup_commands")]
    pub levelup_commands: BTreeMap<u32, Vec<String>>,
}

impl LevelingConfig {
    const fn default_max_level() -> i32 {
        DEFAULT_MAX_LEVEL
    }

    const fn default_max_secondary_level() -> i32 {
        DEFAULT_MAX_SECONDARY_LEVEL
    }

    const fn default_xp_initial() -> i32 {
        DEFAULT_INITIAL_XP
    }

    const fn default_xp_factor() -> f64 {
        DEFAULT_XP_FACTOR
    }

    fn default_levelup_commands() -> BTreeMap<u32, Vec<String>> {
        BTreeMap::from([(
            EVERY_LEVEL,
            vec![
                "eco give %player_name% 250".to_string(),
                "feed %player_name%".to_string(),
            ],
        )])
    }
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            max_level: Self::default_max_level(),
            max_secondary_level: Self::default_max_secondary_level(),
            xp_initial: Self::default_xp_initial(),
            xp_factor: Self::default_xp_factor(),
            levelup_commands: Self::default_levelup_commands(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentModifierConfig {
    #[serde(default = "Modifier::default_payment")]
    pub income: Modifier,
    #[serde(default = "Modifier::default_xp")]
    pub xp: Modifier,
}

impl Default for PaymentModifierConfig {
    fn default() -> Self {
        Self {
            income: Modifier::default_payment(),
            xp: Modifier::default_xp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLimitsConfig {
    /// Keyed by currency id; `"*"` covers currencies not listed.
    #[serde(default = "DailyLimitsConfig::default_currency")]
    pub currency: BTreeMap<String, Modifier>,
    #[serde(default = "Modifier::unlimited")]
    pub xp: Modifier,
}

impl DailyLimitsConfig {
    fn default_currency() -> BTreeMap<String, Modifier> {
        BTreeMap::from([(DEFAULT_ORDER_COST_CURRENCY.to_string(), Modifier::unlimited())])
    }
}

impl Default for DailyLimitsConfig {
    fn default() -> Self {
        Self {
            currency: Self::default_currency(),
            xp: Modifier::unlimited(),
        }
    }
}

/// Special-order ranges of a single objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveOrderConfig {
    #[serde(default = "ObjectiveOrderConfig::default_allowed")]
    pub allowed: bool,
    /// How many distinct objects an order asks for.
    #[serde(default = "ObjectiveOrderConfig::default_objects_amount")]
    pub objects_amount: UniInt,
    /// Required count per object.
    #[serde(default = "ObjectiveOrderConfig::default_objects_count")]
    pub objects_count: UniInt,
}

impl ObjectiveOrderConfig {
    const fn default_allowed() -> bool {
        true
    }

    const fn default_objects_amount() -> UniInt {
        UniInt::of(
            DEFAULT_OBJECTIVE_OBJECTS_AMOUNT.0,
            DEFAULT_OBJECTIVE_OBJECTS_AMOUNT.1,
        )
    }

    const fn default_objects_count() -> UniInt {
        UniInt::of(DEFAULT_OBJECTIVE_OBJECT_COUNT.0, DEFAULT_OBJECTIVE_OBJECT_COUNT.1)
    }
}

impl Default for ObjectiveOrderConfig {
    fn default() -> Self {
        Self {
            allowed: Self::default_allowed(),
            objects_amount: Self::default_objects_amount(),
            objects_count: Self::default_objects_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveConfig {
    #[serde(rename = "type")]
    pub work_type: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub objects: BTreeSet<String>,
    /// Keyed by currency id.
    #[serde(default)]
    pub payment: BTreeMap<String, ObjectiveReward>,
    #[serde(default)]
    pub job_xp: ObjectiveReward,
    #[serde(default = "ObjectiveConfig::default_unlock_level")]
    pub unlock_level: i32,
    #[serde(default)]
    pub special_order: ObjectiveOrderConfig,
}

impl ObjectiveConfig {
    const fn default_unlock_level() -> i32 {
        DEFAULT_UNLOCK_LEVEL
    }

    #[must_use]
    pub fn to_objective(&self, id: &str) -> JobObjective {
        let objective = self.payment.iter().fold(
            JobObjective::new(id, &self.work_type, &self.objects),
            |objective, (currency, reward)| objective.with_payment(currency, *reward),
        );
        objective
            .with_display_name(self.display_name.as_deref().unwrap_or(id))
            .with_xp_reward(self.job_xp)
            .with_unlock_level(level_from_i32(self.unlock_level))
            .with_special_order(
                self.special_order.allowed,
                self.special_order.objects_amount,
                self.special_order.objects_count,
            )
    }

    #[must_use]
    pub fn from_objective(objective: &JobObjective) -> Self {
        Self {
            work_type: objective.work_id().to_string(),
            display_name: Some(objective.display_name().to_string()),
            objects: objective.objects().clone(),
            payment: objective.payment_map().clone(),
            job_xp: *objective.xp_reward(),
            unlock_level: i32::try_from(objective.unlock_level()).unwrap_or(i32::MAX),
            special_order: ObjectiveOrderConfig {
                allowed: objective.is_special_order_allowed(),
                objects_amount: objective.special_order_objects_amount(),
                objects_count: objective.special_order_object_count(),
            },
        }
    }
}

/// On-disk shape of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default = "JobConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub permission_required: bool,
    #[serde(default = "JobConfig::default_initial_state")]
    pub initial_state: JobState,
    #[serde(default = "JobConfig::default_allowed_states")]
    pub allowed_states: BTreeSet<JobState>,
    #[serde(default)]
    pub disabled_worlds: BTreeSet<String>,
    #[serde(default)]
    pub leveling: LevelingConfig,
    #[serde(default)]
    pub payment_modifier: PaymentModifierConfig,
    #[serde(default)]
    pub daily_limits: DailyLimitsConfig,
    #[serde(default)]
    pub special_order: SpecialOrderSettings,
    /// Keyed by objective id.
    #[serde(default)]
    pub objectives: BTreeMap<String, ObjectiveConfig>,
}

impl JobConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_initial_state() -> JobState {
        JobState::Inactive
    }

    fn default_allowed_states() -> BTreeSet<JobState> {
        JobState::ALL.into_iter().collect()
    }

    /// Parse a job config from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(job_id: &str, json: &str) -> Result<Self, JobConfigError> {
        serde_json::from_str(json).map_err(|source| JobConfigError::Parse {
            job: job_id.to_string(),
            source,
        })
    }

    /// Bundled sample job used by tooling and docs.
    #[must_use]
    pub fn sample_miner() -> Self {
        serde_json::from_str(SAMPLE_JOB_DATA).unwrap_or_default()
    }

    /// Capture a built job back into its config shape.
    #[must_use]
    pub fn from_job(job: &Job) -> Self {
        let profile = job.profile();
        let leveling = job.leveling();
        let modifiers = job.modifiers();
        Self {
            enabled: true,
            name: Some(profile.name.clone()),
            description: profile.description.clone(),
            permission_required: profile.permission_required,
            initial_state: job.initial_state(),
            allowed_states: profile.allowed_states.clone(),
            disabled_worlds: profile.disabled_worlds.clone(),
            leveling: LevelingConfig {
                max_level: i32::try_from(leveling.max_level).unwrap_or(i32::MAX),
                max_secondary_level: i32::try_from(leveling.max_secondary_level)
                    .unwrap_or(i32::MAX),
                xp_initial: leveling.initial_xp,
                xp_factor: leveling.xp_factor,
                levelup_commands: job.level_up_command_table().clone(),
            },
            payment_modifier: PaymentModifierConfig {
                income: modifiers.payment_multiplier,
                xp: modifiers.xp_multiplier,
            },
            daily_limits: DailyLimitsConfig {
                currency: modifiers.daily_payment_limits.clone(),
                xp: modifiers.daily_xp_limit,
            },
            special_order: job.special_orders().clone(),
            objectives: job
                .objectives()
                .map(|objective| {
                    (
                        objective.id().to_string(),
                        ObjectiveConfig::from_objective(objective),
                    )
                })
                .collect(),
        }
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            name: None,
            description: Vec::new(),
            permission_required: false,
            initial_state: Self::default_initial_state(),
            allowed_states: Self::default_allowed_states(),
            disabled_worlds: BTreeSet::new(),
            leveling: LevelingConfig::default(),
            payment_modifier: PaymentModifierConfig::default(),
            daily_limits: DailyLimitsConfig::default(),
            special_order: SpecialOrderSettings::default(),
            objectives: BTreeMap::new(),
        }
    }
}

/// A defect found while loading objectives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectiveIssue {
    /// The work type is not registered; the objective was dropped.
    UnknownWorkType { objective: String, work_type: String },
    /// The work type does not recognize an object; the objective was kept.
    UnknownObject { objective: String, object: String },
}

impl ObjectiveIssue {
    #[must_use]
    pub const fn drops_objective(&self) -> bool {
        matches!(self, Self::UnknownWorkType { .. })
    }
}

/// Outcome of loading one job.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub issues: Vec<ObjectiveIssue>,
}

impl LoadReport {
    #[must_use]
    pub fn dropped_objectives(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.drops_objective())
            .count()
    }
}

/// Job built from config together with its load report.
#[derive(Debug)]
pub struct LoadedJob {
    pub job: Job,
    pub report: LoadReport,
}

fn validate_job_id(id: &str) -> Result<String, JobConfigError> {
    let normalized = id.trim().to_lowercase();
    let valid = !normalized.is_empty()
        && normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(normalized)
    } else {
        Err(JobConfigError::InvalidId(id.to_string()))
    }
}

fn capitalize_underscored(id: &str) -> String {
    id.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn validate_objective<R>(
    objective: &JobObjective,
    registry: &R,
    job_id: &str,
    report: &mut LoadReport,
) -> bool
where
    R: WorkRegistry + ?Sized,
{
    let Some(work) = registry.work_type(objective.work_id()) else {
        log::error!(
            "Invalid objective type '{}'. Found in '{job_id}' -> '{}'.",
            objective.work_id(),
            objective.id()
        );
        report.issues.push(ObjectiveIssue::UnknownWorkType {
            objective: objective.id().to_string(),
            work_type: objective.work_id().to_string(),
        });
        return false;
    };
    for object in objective.objects() {
        if object == WILDCARD || work.parse_object(object) {
            continue;
        }
        log::warn!(
            "Unknown object '{object}'. Found in '{job_id}' -> '{}'.",
            objective.id()
        );
        report.issues.push(ObjectiveIssue::UnknownObject {
            objective: objective.id().to_string(),
            object: object.clone(),
        });
    }
    true
}

/// Build a job from its config, validating objectives against `registry`.
///
/// Returns `Ok(None)` for a disabled job.
///
/// # Errors
///
/// Returns an error if the job id is not a valid key.
pub fn load_job<R>(
    id: &str,
    config: &JobConfig,
    registry: &R,
) -> Result<Option<LoadedJob>, JobConfigError>
where
    R: WorkRegistry + ?Sized,
{
    let id = validate_job_id(id)?;
    if !config.enabled {
        log::info!("job '{id}' is disabled; skipping");
        return Ok(None);
    }

    let mut report = LoadReport::default();
    let objectives = config
        .objectives
        .iter()
        .map(|(objective_id, objective)| objective.to_objective(objective_id))
        .filter(|objective| validate_objective(objective, registry, &id, &mut report))
        .collect();

    let profile = JobProfile {
        name: config
            .name
            .clone()
            .unwrap_or_else(|| capitalize_underscored(&id)),
        description: config.description.clone(),
        permission_required: config.permission_required,
        initial_state: Some(config.initial_state),
        allowed_states: config.allowed_states.clone(),
        disabled_worlds: config.disabled_worlds.clone(),
    };
    let leveling = Leveling::normalized(
        config.leveling.max_level,
        config.leveling.max_secondary_level,
        config.leveling.xp_initial,
        config.leveling.xp_factor,
    );
    let modifiers = JobModifiers {
        payment_multiplier: config.payment_modifier.income,
        xp_multiplier: config.payment_modifier.xp,
        daily_payment_limits: config.daily_limits.currency.clone(),
        daily_xp_limit: config.daily_limits.xp,
    };
    let special_orders = SpecialOrderSettings {
        cost: config
            .special_order
            .cost
            .iter()
            .map(|(currency, amount)| (currency.to_lowercase(), *amount))
            .collect(),
        ..config.special_order.clone()
    };

    let job = Job::new(
        &id,
        profile,
        leveling,
        config.leveling.levelup_commands.clone(),
        modifiers,
        special_orders,
        objectives,
    );
    log::debug!(
        "loaded job '{id}' with {} objective(s), {} issue(s)",
        job.objective_map().len(),
        report.issues.len()
    );
    Ok(Some(LoadedJob { job, report }))
}
