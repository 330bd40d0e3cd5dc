//! Jobcraft Engine
//!
//! Platform-agnostic job progression logic: XP curves, level-scaled
//! modifiers, daily caps and special-order generation. Config storage,
//! economy, and work-type detection are supplied by the host through the
//! traits in [`services`] and [`JobDataLoader`].

pub mod config;
pub mod constants;
pub mod employees;
pub mod job;
pub mod level_table;
pub mod modifier;
pub mod numbers;
pub mod objective;
pub mod progress;
pub mod range;
pub mod registry;
pub mod seed;
pub mod services;
pub mod special_order;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

// Re-export commonly used types
pub use config::{
    EngineSettings, JobConfig, JobConfigError, LoadReport, LoadedJob, ObjectiveConfig,
    ObjectiveIssue, OrderReward, load_job,
};
pub use employees::EmployeeCounter;
pub use job::{Job, JobModifiers, JobProfile, JobState, Leveling};
pub use level_table::LevelTable;
pub use modifier::{Limit, Modifier, ModifierAction};
pub use objective::{JobObjective, ObjectiveReward};
pub use progress::{JobProgress, OrderRequest, XpGain};
pub use range::UniInt;
pub use registry::JobRegistry;
pub use seed::{OrderSeedInput, derive_order_seed, order_rng};
pub use services::{
    CatalogWork, CurrencyService, LedgerError, MemoryLedger, WorkCatalog, WorkRegistry, WorkType,
};
pub use special_order::{OrderCount, OrderObjective, SpecialOrder, SpecialOrderSettings};

/// Trait for abstracting config loading operations
/// Platform-specific implementations should provide this
pub trait JobDataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load global engine settings
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be loaded or parsed.
    fn load_settings(&self) -> Result<EngineSettings, Self::Error>;

    /// List the ids of every configured job
    ///
    /// # Errors
    ///
    /// Returns an error if the job listing cannot be read.
    fn job_ids(&self) -> Result<Vec<String>, Self::Error>;

    /// Load the config of a single job
    ///
    /// # Errors
    ///
    /// Returns an error if the job config cannot be loaded or parsed.
    fn load_job_config(&self, job_id: &str) -> Result<JobConfig, Self::Error>;
}

/// Result of a full reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadSummary {
    pub loaded: Vec<String>,
    pub disabled: Vec<String>,
    pub reports: BTreeMap<String, LoadReport>,
}

impl ReloadSummary {
    #[must_use]
    pub fn dropped_objectives(&self) -> usize {
        self.reports.values().map(LoadReport::dropped_objectives).sum()
    }
}

/// Main engine owning the published jobs and settings
pub struct JobEngine<L, W>
where
    L: JobDataLoader,
    W: WorkRegistry,
{
    data_loader: L,
    works: W,
    registry: JobRegistry,
    settings: RwLock<Arc<EngineSettings>>,
}

impl<L, W> JobEngine<L, W>
where
    L: JobDataLoader,
    W: WorkRegistry,
{
    /// Create an engine with no jobs loaded yet
    pub fn new(data_loader: L, works: W) -> Self {
        Self {
            data_loader,
            works,
            registry: JobRegistry::new(),
            settings: RwLock::new(Arc::new(EngineSettings::default())),
        }
    }

    /// Load settings and every job, then publish them together.
    ///
    /// Readers keep whatever snapshot they already hold; nothing is published
    /// if any config fails to load.
    ///
    /// # Errors
    ///
    /// Returns an error if settings or a job config cannot be loaded.
    pub fn reload(&self) -> anyhow::Result<ReloadSummary> {
        let settings = self.data_loader.load_settings()?;
        let mut summary = ReloadSummary::default();
        let mut jobs = Vec::new();
        for job_id in self.data_loader.job_ids()? {
            let config = self.data_loader.load_job_config(&job_id)?;
            match load_job(&job_id, &config, &self.works)? {
                Some(LoadedJob { job, report }) => {
                    summary.loaded.push(job.id().to_string());
                    summary.reports.insert(job.id().to_string(), report);
                    jobs.push(job);
                }
                None => summary.disabled.push(job_id),
            }
        }

        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(settings);
        self.registry.replace_all(jobs);
        log::info!(
            "loaded {} job(s), {} disabled, {} objective(s) dropped",
            summary.loaded.len(),
            summary.disabled.len(),
            summary.dropped_objectives()
        );
        Ok(summary)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<EngineSettings> {
        Arc::clone(&self.settings.read().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub const fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    #[must_use]
    pub fn job(&self, job_id: &str) -> Option<Arc<Job>> {
        self.registry.get(job_id)
    }

    /// Generate a reproducible special order for a player's request.
    #[must_use]
    pub fn special_order_for(
        &self,
        job_id: &str,
        player: &str,
        player_level: u32,
        now_ms: i64,
        server_seed: u64,
    ) -> Option<SpecialOrder> {
        let job = self.job(job_id)?;
        let mut rng = order_rng(server_seed, &OrderSeedInput::at(player, job.id(), now_ms));
        job.create_special_order(&self.settings(), player_level, now_ms, &mut rng)
    }
}
