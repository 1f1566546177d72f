use std::collections::HashMap;

use cronboard_core::{CronboardConfig, JobDescriptor};

/// Read-only directory of job definitions keyed by name.
pub trait JobCatalog: Send + Sync {
    /// Snapshot of every descriptor, in catalog order.
    fn all(&self) -> Vec<JobDescriptor>;

    fn get(&self, name: &str) -> Option<JobDescriptor>;

    /// Unknown names count as disabled.
    fn is_disabled(&self, name: &str) -> bool {
        !matches!(self.get(name), Some(job) if job.enabled)
    }

    /// Names of every descriptor, in catalog order.
    fn names(&self) -> Vec<String> {
        self.all().into_iter().map(|job| job.name).collect()
    }
}

/// In-memory catalog that keeps insertion order.
///
/// Descriptors live in a `Vec`; `index` maps a name to its slot. Re-inserting
/// an existing name replaces the descriptor in its original slot.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    jobs: Vec<JobDescriptor>,
    index: HashMap<String, usize>,
}

impl StaticCatalog {
    pub fn new(jobs: impl IntoIterator<Item = JobDescriptor>) -> Self {
        let mut catalog = Self::default();
        for job in jobs {
            catalog.insert(job);
        }
        catalog
    }

    pub fn from_config(config: &CronboardConfig) -> Self {
        Self::new(config.jobs.iter().cloned())
    }

    pub fn insert(&mut self, job: JobDescriptor) {
        match self.index.get(&job.name) {
            Some(&slot) => {
                tracing::warn!(name = %job.name, "duplicate job definition, later one wins");
                self.jobs[slot] = job;
            }
            None => {
                self.index.insert(job.name.clone(), self.jobs.len());
                self.jobs.push(job);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl JobCatalog for StaticCatalog {
    fn all(&self) -> Vec<JobDescriptor> {
        self.jobs.clone()
    }

    fn get(&self, name: &str) -> Option<JobDescriptor> {
        self.index.get(name).map(|&slot| self.jobs[slot].clone())
    }
}
