//! Participation policy acknowledgements.

use agij_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tracks which version of the participation policy each address accepted.
///
/// Bumping the version invalidates every prior acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyAcknowledgements {
    version: u64,
    acknowledged: HashMap<Address, u64>,
}

impl Default for PolicyAcknowledgements {
    fn default() -> Self {
        Self {
            version: 1,
            acknowledged: HashMap::new(),
        }
    }
}

impl PolicyAcknowledgements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn acknowledge(&mut self, address: Address) {
        self.acknowledged.insert(address, self.version);
    }

    pub fn bump_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    pub fn has_acknowledged(&self, address: &Address) -> bool {
        self.acknowledged.get(address) == Some(&self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_invalidates_prior_acknowledgements() {
        let mut policy = PolicyAcknowledgements::new();
        let who = Address::from_low_u64(1);
        assert!(!policy.has_acknowledged(&who));
        policy.acknowledge(who);
        assert!(policy.has_acknowledged(&who));
        assert_eq!(policy.bump_version(), 2);
        assert!(!policy.has_acknowledged(&who));
        policy.acknowledge(who);
        assert!(policy.has_acknowledged(&who));
    }
}
