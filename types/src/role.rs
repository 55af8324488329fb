//! Roles a participant can be authorised for.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role under which an address is verified and staked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Performs jobs; verified under the agent root.
    Agent,
    /// Adjudicates submitted work; verified under the club root.
    Validator,
}

impl Role {
    /// Stable one-byte tag used when a role is mixed into a hash.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Agent => 0,
            Self::Validator => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent => write!(f, "agent"),
            Self::Validator => write!(f, "validator"),
        }
    }
}
