//! The job-coordination collaborator.

use agij_types::{Address, Job, JobId};

/// Narrow view of the job registry that owns job records.
///
/// The validation engine reads status, the spec hash bound into every
/// commitment, and burn evidence; it writes back only the final outcome.
pub trait JobRegistry: Send + Sync {
    /// Address the registry calls in from. Only this caller may `start` a round.
    fn address(&self) -> Address;

    fn job(&self, job_id: JobId) -> Option<Job>;

    /// Whether the employer's burn receipt has been confirmed for the job.
    /// Slashing-eligible finalization requires it.
    fn burn_confirmed(&self, job_id: JobId) -> bool;

    /// Record the validation outcome.
    fn record_outcome(&self, job_id: JobId, success: bool);
}
