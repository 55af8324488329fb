//! Job records as seen by the validation engine.
//!
//! Jobs are owned by the job-coordination registry; the engine only reads
//! their status and writes the final outcome back.

use crate::{Address, Hash256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric job identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct JobId(u64);

impl JobId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JobId({})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Lifecycle status of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    None,
    Created,
    Applied,
    /// Work has been submitted and awaits validation.
    Submitted,
    Completed,
    /// Validators rejected the work (or failed to reach an outcome).
    Disputed,
    Finalized,
    Cancelled,
}

impl JobStatus {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

/// A job as stored by the job registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub employer: Address,
    pub agent: Address,
    pub reward: u128,
    pub stake: u128,
    pub status: JobStatus,
    /// Outcome recorded by finalization.
    pub success: bool,
    pub spec_hash: Hash256,
    pub result_hash: Hash256,
    pub uri_hash: Hash256,
}

impl Job {
    /// A submitted job with zeroed economics, as used by fixtures.
    pub fn submitted(id: JobId, employer: Address) -> Self {
        Self {
            id,
            employer,
            agent: Address::ZERO,
            reward: 0,
            stake: 0,
            status: JobStatus::Submitted,
            success: false,
            spec_hash: Hash256::ZERO,
            result_hash: Hash256::ZERO,
            uri_hash: Hash256::ZERO,
        }
    }
}
