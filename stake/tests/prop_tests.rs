use proptest::prelude::*;

use agij_stake::{MemoryStakeLedger, StakeLedger};
use agij_types::{Address, Role};

proptest! {
    /// A successful slash reduces stake by exactly the slashed amount.
    #[test]
    fn slash_is_exact(stake in 1u128..1_000_000_000, pct in 0u128..=100) {
        let ledger = MemoryStakeLedger::new();
        let addr = Address::from_low_u64(1);
        ledger.set_stake(addr, Role::Validator, stake);
        let amount = stake * pct / 100;
        ledger.slash(&addr, Role::Validator, amount).unwrap();
        prop_assert_eq!(ledger.stake_of(&addr, Role::Validator), stake - amount);
        prop_assert_eq!(ledger.total_slashed(), amount);
    }

    /// Slashing more than the stake never changes the balance.
    #[test]
    fn overslash_is_rejected(stake in 0u128..1_000_000, extra in 1u128..1_000) {
        let ledger = MemoryStakeLedger::new();
        let addr = Address::from_low_u64(2);
        ledger.set_stake(addr, Role::Validator, stake);
        prop_assert!(ledger.slash(&addr, Role::Validator, stake + extra).is_err());
        prop_assert_eq!(ledger.stake_of(&addr, Role::Validator), stake);
    }
}
