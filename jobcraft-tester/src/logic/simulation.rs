//! Seeded sweeps over special-order generation with per-order shape checks.
use colored::Colorize;
use jobcraft_engine::{Job, JobEngine, SpecialOrder, WorkCatalog};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use super::loader::ConfigDirLoader;

pub type TesterEngine = JobEngine<ConfigDirLoader, WorkCatalog>;

const DAY_MS: i64 = 86_400_000;
const SIMULATED_PLAYER: &str = "simulated-player";

/// Inputs shared by every job and seed in a run.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub level: u32,
    pub iterations: usize,
    pub start_ms: i64,
}

/// Aggregated outcome for one job under one server seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSimulationResult {
    pub job_id: String,
    pub job_name: String,
    pub seed: u64,
    pub level: u32,
    pub passed: bool,
    pub iterations_run: usize,
    pub orders_generated: usize,
    pub unavailable: usize,
    /// Objectives per order -> number of orders.
    pub objective_histogram: BTreeMap<usize, usize>,
    pub reward_histogram: BTreeMap<String, usize>,
    pub average_duration_secs: f64,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub elapsed: Duration,
}

pub struct OrderSimulator<'a> {
    engine: &'a TesterEngine,
    verbose: bool,
}

impl<'a> OrderSimulator<'a> {
    pub const fn new(engine: &'a TesterEngine, verbose: bool) -> Self {
        Self { engine, verbose }
    }

    pub fn run(
        &self,
        job_ids: &[String],
        seeds: &[u64],
        plan: &SimulationPlan,
    ) -> Vec<JobSimulationResult> {
        let mut results = Vec::new();
        for job_id in job_ids {
            let Some(job) = self.engine.job(job_id) else {
                eprintln!("⚠️  Unknown job: {}", job_id.yellow());
                continue;
            };
            for &seed in seeds {
                if self.verbose {
                    println!(
                        "🧪 Sampling orders: {} (seed {seed}, level {})",
                        job.name().bright_white(),
                        plan.level
                    );
                }
                results.push(self.run_single(&job, seed, plan));
            }
        }
        results
    }

    fn run_single(&self, job: &Job, seed: u64, plan: &SimulationPlan) -> JobSimulationResult {
        let started = Instant::now();
        let mut result = JobSimulationResult {
            job_id: job.id().to_string(),
            job_name: job.name().to_string(),
            seed,
            level: plan.level,
            passed: true,
            iterations_run: plan.iterations,
            orders_generated: 0,
            unavailable: 0,
            objective_histogram: BTreeMap::new(),
            reward_histogram: BTreeMap::new(),
            average_duration_secs: 0.0,
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        };
        let mut total_duration_secs = 0_i64;

        for i in 0..plan.iterations {
            let day = i64::try_from(i).unwrap_or(i64::MAX);
            let now_ms = plan.start_ms.saturating_add(day.saturating_mul(DAY_MS));
            let Some(order) = self.sample(job, plan.level, now_ms, seed) else {
                result.unavailable += 1;
                continue;
            };

            if self.sample(job, plan.level, now_ms, seed).as_ref() != Some(&order) {
                result
                    .failures
                    .push(format!("Iteration {}: replay with the same seed differed", i + 1));
            }
            for problem in check_order(job, &order, now_ms) {
                result.failures.push(format!("Iteration {}: {problem}", i + 1));
            }

            result.orders_generated += 1;
            *result
                .objective_histogram
                .entry(order.objectives.len())
                .or_insert(0) += 1;
            for reward in &order.rewards {
                *result.reward_histogram.entry(reward.clone()).or_insert(0) += 1;
            }
            total_duration_secs += (order.expire_at - now_ms) / 1000;
        }

        if result.orders_generated > 0 {
            #[allow(clippy::cast_precision_loss)]
            let average = total_duration_secs as f64 / result.orders_generated as f64;
            result.average_duration_secs = average;
        }
        result.passed = result.failures.is_empty();
        result.elapsed = started.elapsed();
        log::debug!(
            "job '{}' seed {seed}: {} order(s), {} unavailable",
            result.job_id,
            result.orders_generated,
            result.unavailable
        );
        result
    }

    fn sample(&self, job: &Job, level: u32, now_ms: i64, seed: u64) -> Option<SpecialOrder> {
        self.engine
            .special_order_for(job.id(), SIMULATED_PLAYER, level, now_ms, seed)
    }
}

/// Shape violations of `order` against the job that produced it.
pub fn check_order(job: &Job, order: &SpecialOrder, now_ms: i64) -> Vec<String> {
    let mut problems = Vec::new();
    let cfg = job.special_orders();

    if order.objectives.is_empty() {
        problems.push("order has no objectives".to_string());
    }
    let max_objectives = usize::try_from(cfg.objectives_amount.max()).unwrap_or(0);
    if order.objectives.len() > max_objectives {
        problems.push(format!(
            "{} objectives exceed the configured maximum {max_objectives}",
            order.objectives.len()
        ));
    }

    for (objective_id, entry) in &order.objectives {
        let Some(objective) = job.objective(objective_id) else {
            problems.push(format!("unknown objective '{objective_id}'"));
            continue;
        };
        if !objective.is_special_order_allowed() {
            problems.push(format!("objective '{objective_id}' is not allowed in orders"));
        }
        let max_objects =
            usize::try_from(objective.special_order_objects_amount().max()).unwrap_or(0);
        if entry.counts.is_empty() || entry.counts.len() > max_objects {
            problems.push(format!(
                "objective '{objective_id}' holds {} objects",
                entry.counts.len()
            ));
        }
        let range = objective.special_order_object_count();
        for (object, count) in &entry.counts {
            if !objective.objects().contains(object) {
                problems.push(format!("object '{object}' is not part of '{objective_id}'"));
            }
            let required = i64::from(count.required);
            if required < i64::from(range.min().max(1)) || required > i64::from(range.max()) {
                problems.push(format!(
                    "'{objective_id}' -> '{object}' requires {required}, outside [{}, {}]",
                    range.min(),
                    range.max()
                ));
            }
        }
    }

    let unique: BTreeSet<&String> = order.rewards.iter().collect();
    if unique.len() != order.rewards.len() {
        problems.push("duplicate rewards".to_string());
    }
    let max_rewards = usize::try_from(cfg.rewards_amount.max()).unwrap_or(0);
    if order.rewards.len() > max_rewards {
        problems.push(format!("{} rewards exceed {max_rewards}", order.rewards.len()));
    }

    let duration_ms = order.expire_at - now_ms;
    let min_ms = i64::from(cfg.duration_secs.min().max(1)) * 1000;
    let max_ms = i64::from(cfg.duration_secs.max()) * 1000;
    if duration_ms < min_ms || duration_ms > max_ms {
        problems.push(format!("duration {duration_ms} ms outside [{min_ms}, {max_ms}]"));
    }
    if order.completed {
        problems.push("new order is already completed".to_string());
    }
    problems
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobcraft_engine::{OrderCount, OrderObjective};

    fn engine() -> TesterEngine {
        let engine = JobEngine::new(ConfigDirLoader::bundled(), WorkCatalog::standard());
        engine.reload().unwrap();
        engine
    }

    fn plan(iterations: usize) -> SimulationPlan {
        SimulationPlan {
            level: 12,
            iterations,
            start_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn sample_job_passes_every_check() {
        let engine = engine();
        let simulator = OrderSimulator::new(&engine, false);
        let results = simulator.run(&["miner".to_string()], &[1, 2, 3], &plan(25));
        assert_eq!(results.len(), 3);
        for result in &results {
            assert!(result.passed, "{:?}", result.failures);
            assert_eq!(result.orders_generated, 25);
            assert_eq!(result.unavailable, 0);
            assert!(result.objective_histogram.keys().all(|&n| (1..=2).contains(&n)));
            assert!(result.average_duration_secs >= 14_400.0);
        }
    }

    #[test]
    fn unknown_jobs_are_skipped() {
        let engine = engine();
        let simulator = OrderSimulator::new(&engine, false);
        assert!(simulator.run(&["ghost".to_string()], &[1], &plan(1)).is_empty());
    }

    #[test]
    fn check_flags_foreign_objectives() {
        let engine = engine();
        let job = engine.job("miner").unwrap();
        let now_ms = 0;
        let order = SpecialOrder {
            objectives: BTreeMap::from([(
                "ancient_debris".to_string(),
                OrderObjective {
                    objective_id: "ancient_debris".to_string(),
                    counts: BTreeMap::from([("ancient_debris".to_string(), OrderCount::new(1))]),
                },
            )]),
            rewards: ["money_small".to_string(), "money_small".to_string()]
                .into_iter()
                .collect(),
            completed: false,
            expire_at: 1_000,
        };
        let problems = check_order(&job, &order, now_ms);
        assert!(problems.iter().any(|p| p.contains("not allowed")));
        assert!(problems.iter().any(|p| p.contains("duplicate rewards")));
        assert!(problems.iter().any(|p| p.contains("duration")));
    }
}
