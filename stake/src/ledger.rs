//! Role-scoped stake ledger.

use crate::error::StakeError;
use agij_types::{Address, Role};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Read/mutate interface to staked collateral.
///
/// Implementations must apply each call atomically: a failed `slash` or
/// `slash_batch` leaves every balance untouched.
pub trait StakeLedger: Send + Sync {
    /// Collateral `address` currently holds in `role`.
    fn stake_of(&self, address: &Address, role: Role) -> u128;

    /// Remove `amount` from `address`'s stake in `role`.
    fn slash(&self, address: &Address, role: Role, amount: u128) -> Result<(), StakeError>;

    /// Remove every `(address, amount)` from stake in `role`, or none of them.
    fn slash_batch(&self, role: Role, slashes: &[(Address, u128)]) -> Result<(), StakeError>;
}

/// In-memory stake ledger.
#[derive(Default)]
pub struct MemoryStakeLedger {
    stakes: RwLock<HashMap<(Address, Role), u128>>,
    total_slashed: RwLock<u128>,
}

impl MemoryStakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stake held by `address` in `role`.
    pub fn set_stake(&self, address: Address, role: Role, amount: u128) {
        let mut stakes = self.stakes.write().unwrap_or_else(PoisonError::into_inner);
        if amount == 0 {
            stakes.remove(&(address, role));
        } else {
            stakes.insert((address, role), amount);
        }
    }

    /// Add `amount` to the stake held by `address` in `role`.
    pub fn deposit(&self, address: Address, role: Role, amount: u128) -> Result<(), StakeError> {
        if amount == 0 {
            return Err(StakeError::ZeroAmount);
        }
        let mut stakes = self.stakes.write().unwrap_or_else(PoisonError::into_inner);
        let entry = stakes.entry((address, role)).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(StakeError::Overflow)?;
        Ok(())
    }

    /// Sum of everything slashed through this ledger.
    pub fn total_slashed(&self) -> u128 {
        *self.total_slashed.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StakeLedger for MemoryStakeLedger {
    fn stake_of(&self, address: &Address, role: Role) -> u128 {
        self.stakes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(*address, role))
            .copied()
            .unwrap_or(0)
    }

    fn slash(&self, address: &Address, role: Role, amount: u128) -> Result<(), StakeError> {
        let mut stakes = self.stakes.write().unwrap_or_else(PoisonError::into_inner);
        let available = stakes.get(&(*address, role)).copied().unwrap_or(0);
        if available < amount {
            return Err(StakeError::InsufficientStake {
                address: *address,
                role,
                needed: amount,
                available,
            });
        }
        let remaining = available - amount;
        if remaining == 0 {
            stakes.remove(&(*address, role));
        } else {
            stakes.insert((*address, role), remaining);
        }
        drop(stakes);

        let mut total = self.total_slashed.write().unwrap_or_else(PoisonError::into_inner);
        *total = total.saturating_add(amount);
        tracing::debug!(%address, %role, amount, remaining, "stake slashed");
        Ok(())
    }

    fn slash_batch(&self, role: Role, slashes: &[(Address, u128)]) -> Result<(), StakeError> {
        let mut stakes = self.stakes.write().unwrap_or_else(PoisonError::into_inner);

        // Repeated addresses are summed before checking.
        let mut needed: HashMap<Address, u128> = HashMap::with_capacity(slashes.len());
        let mut batch_total: u128 = 0;
        for (address, amount) in slashes {
            let entry = needed.entry(*address).or_insert(0);
            *entry = entry.checked_add(*amount).ok_or(StakeError::Overflow)?;
            batch_total = batch_total.saturating_add(*amount);
        }
        for (address, amount) in &needed {
            let available = stakes.get(&(*address, role)).copied().unwrap_or(0);
            if available < *amount {
                return Err(StakeError::InsufficientStake {
                    address: *address,
                    role,
                    needed: *amount,
                    available,
                });
            }
        }

        for (address, amount) in needed {
            let key = (address, role);
            let remaining = stakes.get(&key).copied().unwrap_or(0) - amount;
            if remaining == 0 {
                stakes.remove(&key);
            } else {
                stakes.insert(key, remaining);
            }
        }
        drop(stakes);

        let mut total = self.total_slashed.write().unwrap_or_else(PoisonError::into_inner);
        *total = total.saturating_add(batch_total);
        tracing::debug!(%role, entries = slashes.len(), amount = batch_total, "stake slashed in batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    #[test]
    fn stakes_are_role_scoped() {
        let ledger = MemoryStakeLedger::new();
        ledger.set_stake(addr(1), Role::Validator, 100);
        assert_eq!(ledger.stake_of(&addr(1), Role::Validator), 100);
        assert_eq!(ledger.stake_of(&addr(1), Role::Agent), 0);
    }

    #[test]
    fn slash_reduces_stake() {
        let ledger = MemoryStakeLedger::new();
        ledger.set_stake(addr(1), Role::Validator, 100);
        ledger.slash(&addr(1), Role::Validator, 50).unwrap();
        assert_eq!(ledger.stake_of(&addr(1), Role::Validator), 50);
        assert_eq!(ledger.total_slashed(), 50);
    }

    #[test]
    fn slash_beyond_stake_fails_without_effect() {
        let ledger = MemoryStakeLedger::new();
        ledger.set_stake(addr(1), Role::Validator, 10);
        let err = ledger.slash(&addr(1), Role::Validator, 11).unwrap_err();
        assert!(matches!(err, StakeError::InsufficientStake { available: 10, .. }));
        assert_eq!(ledger.stake_of(&addr(1), Role::Validator), 10);
        assert_eq!(ledger.total_slashed(), 0);
    }

    #[test]
    fn slash_batch_applies_every_entry() {
        let ledger = MemoryStakeLedger::new();
        ledger.set_stake(addr(1), Role::Validator, 100);
        ledger.set_stake(addr(2), Role::Validator, 40);
        ledger
            .slash_batch(Role::Validator, &[(addr(1), 50), (addr(2), 40)])
            .unwrap();
        assert_eq!(ledger.stake_of(&addr(1), Role::Validator), 50);
        assert_eq!(ledger.stake_of(&addr(2), Role::Validator), 0);
        assert_eq!(ledger.total_slashed(), 90);
    }

    #[test]
    fn slash_batch_with_one_bad_entry_changes_nothing() {
        let ledger = MemoryStakeLedger::new();
        ledger.set_stake(addr(1), Role::Validator, 100);
        ledger.set_stake(addr(2), Role::Validator, 10);
        let err = ledger
            .slash_batch(Role::Validator, &[(addr(1), 50), (addr(2), 11)])
            .unwrap_err();
        assert!(matches!(err, StakeError::InsufficientStake { needed: 11, available: 10, .. }));
        assert_eq!(ledger.stake_of(&addr(1), Role::Validator), 100);
        assert_eq!(ledger.stake_of(&addr(2), Role::Validator), 10);
        assert_eq!(ledger.total_slashed(), 0);
    }

    #[test]
    fn slash_batch_sums_repeated_addresses() {
        let ledger = MemoryStakeLedger::new();
        ledger.set_stake(addr(1), Role::Validator, 60);
        assert!(ledger
            .slash_batch(Role::Validator, &[(addr(1), 40), (addr(1), 40)])
            .is_err());
        assert_eq!(ledger.stake_of(&addr(1), Role::Validator), 60);
    }

    #[test]
    fn deposit_accumulates() {
        let ledger = MemoryStakeLedger::new();
        ledger.deposit(addr(2), Role::Validator, 5).unwrap();
        ledger.deposit(addr(2), Role::Validator, 7).unwrap();
        assert_eq!(ledger.stake_of(&addr(2), Role::Validator), 12);
    }

    #[test]
    fn deposit_zero_rejected() {
        let ledger = MemoryStakeLedger::new();
        assert_eq!(
            ledger.deposit(addr(2), Role::Validator, 0),
            Err(StakeError::ZeroAmount)
        );
    }
}
