//! Published job set. Readers hold `Arc<Job>` snapshots; reloads swap in
//! fully built replacements.
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::job::Job;

#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<BTreeMap<String, Arc<Job>>>,
}

impl JobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<Job>> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&id.to_lowercase()).cloned()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.keys().cloned().collect()
    }

    #[must_use]
    pub fn jobs(&self) -> Vec<Arc<Job>> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Publish one job. It shares employee counters with the job it replaces.
    pub fn publish(&self, job: Job) -> Arc<Job> {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        Self::insert_locked(&mut jobs, job)
    }

    /// Replace the whole set; jobs missing from `replacements` are removed.
    pub fn replace_all(&self, replacements: Vec<Job>) {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::take(&mut *jobs);
        for job in replacements {
            let job = match previous.get(job.id()) {
                Some(old) => job.sharing_employees_with(old),
                None => job,
            };
            jobs.insert(job.id().to_string(), Arc::new(job));
        }
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Job>> {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        jobs.remove(&id.to_lowercase())
    }

    fn insert_locked(jobs: &mut BTreeMap<String, Arc<Job>>, job: Job) -> Arc<Job> {
        let job = match jobs.get(job.id()) {
            Some(previous) => job.sharing_employees_with(previous),
            None => job,
        };
        let job = Arc::new(job);
        jobs.insert(job.id().to_string(), Arc::clone(&job));
        job
    }
}
