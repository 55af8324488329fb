//! Nullable job registry.

use agij_types::{Address, Job, JobId, JobStatus};
use agij_validation::JobRegistry;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

/// An in-memory job registry that records every outcome it is given.
///
/// Burn evidence is confirmed for every job unless withheld.
pub struct NullJobRegistry {
    address: Address,
    jobs: Mutex<HashMap<JobId, Job>>,
    burn_withheld: Mutex<HashSet<JobId>>,
    outcomes: Mutex<Vec<(JobId, bool)>>,
}

impl NullJobRegistry {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            jobs: Mutex::new(HashMap::new()),
            burn_withheld: Mutex::new(HashSet::new()),
            outcomes: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, job: Job) {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(job.id, job);
    }

    /// Insert a submitted job owned by `employer`.
    pub fn submit(&self, id: JobId, employer: Address) {
        self.insert(Job::submitted(id, employer));
    }

    pub fn set_status(&self, id: JobId, status: JobStatus) {
        if let Some(job) = self
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&id)
        {
            job.status = status;
        }
    }

    pub fn withhold_burn(&self, id: JobId, withheld: bool) {
        let mut set = self.burn_withheld.lock().unwrap_or_else(PoisonError::into_inner);
        if withheld {
            set.insert(id);
        } else {
            set.remove(&id);
        }
    }

    /// Every outcome recorded, in order.
    pub fn outcomes(&self) -> Vec<(JobId, bool)> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl JobRegistry for NullJobRegistry {
    fn address(&self) -> Address {
        self.address
    }

    fn job(&self, job_id: JobId) -> Option<Job> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&job_id)
            .cloned()
    }

    fn burn_confirmed(&self, job_id: JobId) -> bool {
        !self
            .burn_withheld
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&job_id)
    }

    fn record_outcome(&self, job_id: JobId, success: bool) {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(job) = jobs.get_mut(&job_id) {
            job.success = success;
            job.status = if success {
                JobStatus::Completed
            } else {
                JobStatus::Disputed
            };
        }
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((job_id, success));
    }
}
