//! Diagnostic events emitted by identity verification and configuration.

use crate::config::ConfigSummary;
use crate::registry::VerificationPath;
use agij_types::{Address, Hash256, Role};

/// Why a verification attempt failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    Blacklisted,
    /// Every path was tried and none matched.
    NoMatch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentityEvent {
    Verified {
        role: Role,
        address: Address,
        node: Hash256,
        label: String,
        path: VerificationPath,
    },
    VerificationFailed {
        role: Role,
        address: Address,
        label: String,
        reason: FailureReason,
    },
    /// The name service faulted; verification continued with fallbacks.
    RecoveryInitiated {
        role: Role,
        address: Address,
        node: Hash256,
        reason: String,
    },
    ConfigurationApplied(ConfigSummary),
    AllowListUpdated {
        role: Role,
        address: Address,
        allowed: bool,
    },
    CacheVersionBumped {
        version: u64,
    },
}
