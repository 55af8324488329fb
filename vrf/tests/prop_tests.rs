use proptest::prelude::*;

use agij_types::Address;
use agij_vrf::EntropyRound;

proptest! {
    /// Contributor count equals the number of distinct contributors, whatever the order.
    #[test]
    fn contributor_count_is_distinct(ids in prop::collection::vec(1u64..8, 1..32)) {
        let mut round = EntropyRound::open(Address::from_low_u64(ids[0]), 0, 0, 1);
        for id in &ids[1..] {
            round.contribute(Address::from_low_u64(*id), *id as u128);
        }
        let mut distinct = ids.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(round.contributor_count(), distinct.len());
    }

    /// The target block never changes after the round opens.
    #[test]
    fn target_is_fixed(current in 0u64..1_000_000, delay in 1u64..64, extra in 1u64..16) {
        let mut round = EntropyRound::open(Address::from_low_u64(1), 1, current, delay);
        for i in 0..extra {
            round.contribute(Address::from_low_u64(100 + i), i as u128);
        }
        prop_assert_eq!(round.target_block(), current + delay);
    }
}
