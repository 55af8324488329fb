//! Persistent module state.

use crate::error::ValidationError;
use crate::policy::PolicyAcknowledgements;
use crate::state::JobRound;
use agij_identity::{AuthorizationCache, IdentityConfig};
use agij_types::{Address, Hash256, JobId, ValidationParams};
use serde::{Deserialize, Serialize};

/// Everything needed to rebuild a [`crate::ValidationModule`] apart from
/// its collaborators and identity service handles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    pub governance: Address,
    pub params: ValidationParams,
    pub pool: Vec<Address>,
    /// Sorted by job id.
    pub rounds: Vec<JobRound>,
    /// `(job, validator, nonce, commitment)`, sorted by key.
    pub commitments: Vec<(JobId, Address, u64, Hash256)>,
    pub identity: IdentityConfig,
    pub cache: AuthorizationCache,
    pub policy: PolicyAcknowledgements,
    pub policy_enforced: bool,
    pub paused: bool,
    /// Start cursor for the next rotating selection window.
    pub pool_rotation: u64,
}

impl ModuleSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ValidationError> {
        bincode::serialize(self).map_err(|e| ValidationError::Codec(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        bincode::deserialize(bytes).map_err(|e| ValidationError::Codec(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            ModuleSnapshot::from_bytes(&[0xff, 0x01]),
            Err(ValidationError::Codec(_))
        ));
    }
}
