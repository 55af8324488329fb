use agij_identity::IdentityError;
use agij_stake::StakeError;
use agij_types::{Address, JobId, TypesError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("job {0} has not been submitted")]
    JobNotSubmitted(JobId),

    #[error("validators already selected for job {0}")]
    ValidatorsAlreadySelected(JobId),

    #[error("insufficient validators: {eligible} eligible, committee must be in [{min}, {max}]")]
    InsufficientValidators { eligible: usize, min: u32, max: u32 },

    #[error("{validator} is not a selected validator for job {job}")]
    NotValidator { job: JobId, validator: Address },

    #[error("{validator} already committed for job {job}")]
    AlreadyCommitted { job: JobId, validator: Address },

    #[error("commit phase closed for job {0}")]
    CommitPhaseClosed(JobId),

    #[error("commit phase still open for job {0}")]
    CommitPhaseOpen(JobId),

    #[error("reveal phase closed for job {0}")]
    RevealPhaseClosed(JobId),

    #[error("{validator} has no commitment for job {job}")]
    NotCommitted { job: JobId, validator: Address },

    #[error("reveal by {validator} does not match commitment for job {job}")]
    InvalidReveal { job: JobId, validator: Address },

    #[error("reveal window for job {0} has not elapsed")]
    RevealPending(JobId),

    #[error("job {0} already finalized")]
    AlreadyFinalized(JobId),

    #[error("burn evidence missing for job {0}")]
    BurnEvidenceMissing(JobId),

    #[error("force finalize for job {0} not yet permitted")]
    ForceFinalizeTooEarly(JobId),

    #[error("{0} has not acknowledged the current policy")]
    PolicyNotAcknowledged(Address),

    #[error("validation is paused")]
    Paused,

    #[error("{0} is not authorized for this operation")]
    Unauthorized(Address),

    #[error("invalid required approvals: {0}")]
    InvalidApprovals(u32),

    #[error("zero address supplied for {0}")]
    ZeroAddress(&'static str),

    #[error("duplicate validator {0} in pool")]
    DuplicateValidator(Address),

    #[error("validator pool of {size} exceeds maximum {max}")]
    PoolTooLarge { size: usize, max: u32 },

    #[error("invalid parameters: {0}")]
    Params(#[from] TypesError),

    #[error("identity: {0}")]
    Identity(#[from] IdentityError),

    #[error("stake ledger: {0}")]
    Stake(#[from] StakeError),

    #[error("snapshot codec: {0}")]
    Codec(String),
}
