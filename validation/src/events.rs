//! Events emitted by the validation module for the node to process.

use agij_identity::IdentityEvent;
use agij_types::{Address, BlockNumber, Hash256, JobId, Role};

/// Why a selection attempt produced no committee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionResetReason {
    /// Fewer than two distinct parties contributed entropy.
    TooFewContributors { have: usize },
    /// The target block's hash is no longer available.
    MissingBlockHash(BlockNumber),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationEvent {
    EntropyContributed {
        job: JobId,
        contributor: Address,
        /// False for a repeat contributor.
        counted: bool,
        target_block: BlockNumber,
    },
    ValidatorsSelected {
        job: JobId,
        nonce: u64,
        validators: Vec<Address>,
    },
    /// The rotating window moved; `rotation` is the next start cursor.
    ValidatorPoolRotationUpdated {
        job: JobId,
        rotation: u64,
    },
    SelectionReset {
        job: JobId,
        nonce: u64,
        reason: SelectionResetReason,
    },
    ValidatorIdentityVerified {
        job: JobId,
        validator: Address,
        node: Hash256,
        label: String,
        used_fallback: bool,
    },
    ValidationCommitted {
        job: JobId,
        validator: Address,
        commitment: Hash256,
        nonce: u64,
    },
    ValidationRevealed {
        job: JobId,
        validator: Address,
        approve: bool,
        burn_hash: Hash256,
        nonce: u64,
    },
    ValidationFinalized {
        job: JobId,
        nonce: u64,
        success: bool,
        approvals: u32,
        rejections: u32,
        /// Finalized through the housekeeping path; nothing was slashed.
        forced: bool,
    },
    ValidatorSlashed {
        job: JobId,
        validator: Address,
        amount: u128,
    },
    ValidatorRewarded {
        job: JobId,
        validator: Address,
    },
    NonceReset {
        job: JobId,
        nonce: u64,
    },
    PolicyVersionBumped {
        version: u64,
    },
    PauseUpdated {
        paused: bool,
    },
    AuthorizationLookup {
        role: Role,
        address: Address,
        hit: bool,
    },
    /// Forwarded from the identity verifier.
    Identity(IdentityEvent),
}
