//! Reputation ledger and blacklist.

use agij_types::Address;
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

/// Reputation scores and the participant blacklist.
pub trait ReputationLedger: Send + Sync {
    /// Credit `amount` reputation to `address`.
    fn add(&self, address: &Address, amount: u64);

    fn reputation(&self, address: &Address) -> u64;

    fn is_blacklisted(&self, address: &Address) -> bool;
}

/// In-memory reputation ledger.
#[derive(Default)]
pub struct MemoryReputationLedger {
    scores: RwLock<HashMap<Address, u64>>,
    blacklist: RwLock<HashSet<Address>>,
}

impl MemoryReputationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_blacklist(&self, address: Address, listed: bool) {
        let mut blacklist = self.blacklist.write().unwrap_or_else(PoisonError::into_inner);
        if listed {
            blacklist.insert(address);
        } else {
            blacklist.remove(&address);
        }
        tracing::info!(%address, listed, "blacklist updated");
    }
}

impl ReputationLedger for MemoryReputationLedger {
    fn add(&self, address: &Address, amount: u64) {
        let mut scores = self.scores.write().unwrap_or_else(PoisonError::into_inner);
        let score = scores.entry(*address).or_insert(0);
        *score = score.saturating_add(amount);
    }

    fn reputation(&self, address: &Address) -> u64 {
        self.scores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    fn is_blacklisted(&self, address: &Address) -> bool {
        self.blacklist
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(address)
    }
}
