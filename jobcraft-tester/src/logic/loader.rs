//! Job config sources for the tester: a directory on disk or the bundled sample.
use jobcraft_engine::{EngineSettings, JobConfig, JobConfigError, JobDataLoader};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const SETTINGS_FILE: &str = "settings.json";
const JOBS_DIR: &str = "jobs";
const SAMPLE_JOB_ID: &str = "miner";

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] JobConfigError),
}

/// Reads `settings.json` and `jobs/<id>.json` under a root directory, or
/// serves the bundled sample when no root is given.
#[derive(Debug, Clone, Default)]
pub struct ConfigDirLoader {
    root: Option<PathBuf>,
}

impl ConfigDirLoader {
    #[must_use]
    pub const fn bundled() -> Self {
        Self { root: None }
    }

    #[must_use]
    pub fn from_dir(root: &Path) -> Self {
        Self {
            root: Some(root.to_path_buf()),
        }
    }

    fn read(path: &Path) -> Result<String, LoaderError> {
        fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl JobDataLoader for ConfigDirLoader {
    type Error = LoaderError;

    fn load_settings(&self) -> Result<EngineSettings, Self::Error> {
        let Some(root) = &self.root else {
            return Ok(EngineSettings::load_from_static());
        };
        let path = root.join(SETTINGS_FILE);
        if !path.exists() {
            log::warn!("{} not found; using bundled settings", path.display());
            return Ok(EngineSettings::load_from_static());
        }
        Ok(EngineSettings::from_json(&Self::read(&path)?)?)
    }

    fn job_ids(&self) -> Result<Vec<String>, Self::Error> {
        let Some(root) = &self.root else {
            return Ok(vec![SAMPLE_JOB_ID.to_string()]);
        };
        let dir = root.join(JOBS_DIR);
        let entries = fs::read_dir(&dir).map_err(|source| LoaderError::Io {
            path: dir.clone(),
            source,
        })?;
        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn load_job_config(&self, job_id: &str) -> Result<JobConfig, Self::Error> {
        let Some(root) = &self.root else {
            return Ok(JobConfig::sample_miner());
        };
        let path = root.join(JOBS_DIR).join(format!("{job_id}.json"));
        Ok(JobConfig::from_json(job_id, &Self::read(&path)?)?)
    }
}
