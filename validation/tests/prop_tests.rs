use proptest::prelude::*;

use agij_types::{Address, Hash256, JobId};
use agij_validation::{commitment_hash, slash_amount, FinalizationEngine, RevealedVote, ValidatorSelector};

fn arb_pool() -> impl Strategy<Value = Vec<(Address, u128)>> {
    prop::collection::vec(1u128..1_000_000, 1..40).prop_map(|stakes| {
        stakes
            .into_iter()
            .enumerate()
            .map(|(i, stake)| (Address::from_low_u64(i as u64 + 1), stake))
            .collect()
    })
}

proptest! {
    /// Weighted sampling yields min(count, pool) distinct pool members.
    #[test]
    fn sampling_unique_members(
        pool in arb_pool(),
        seed in prop::array::uniform32(0u8..),
        count in 0usize..50,
    ) {
        let selected = ValidatorSelector.sample(&Hash256::new(seed), &pool, count).unwrap();
        prop_assert_eq!(selected.len(), count.min(pool.len()));
        let mut unique = selected.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), selected.len());
        for v in &selected {
            prop_assert!(pool.iter().any(|(a, _)| a == v));
        }
    }

    /// Same seed, same pool, same committee.
    #[test]
    fn sampling_deterministic(pool in arb_pool(), seed in prop::array::uniform32(0u8..)) {
        let seed = Hash256::new(seed);
        prop_assert_eq!(
            ValidatorSelector.sample(&seed, &pool, 3),
            ValidatorSelector.sample(&seed, &pool, 3)
        );
    }

    /// Changing any single committed field changes the commitment.
    #[test]
    fn commitment_binds_every_field(
        job in any::<u64>(),
        nonce in 0u64..u64::MAX,
        approve in any::<bool>(),
        burn in prop::array::uniform32(0u8..),
        salt in prop::array::uniform32(0u8..),
        spec in prop::array::uniform32(0u8..),
        flip in 0u8..255,
    ) {
        let (burn, salt, spec) = (Hash256::new(burn), Hash256::new(salt), Hash256::new(spec));
        let job = JobId::new(job);
        let base = commitment_hash(job, nonce, approve, &burn, &salt, &spec);

        prop_assert_ne!(base, commitment_hash(job, nonce + 1, approve, &burn, &salt, &spec));
        prop_assert_ne!(base, commitment_hash(job, nonce, !approve, &burn, &salt, &spec));

        let mut tweaked = *salt.as_bytes();
        tweaked[0] ^= flip.max(1);
        prop_assert_ne!(base, commitment_hash(job, nonce, approve, &burn, &Hash256::new(tweaked), &spec));
    }

    /// Success implies a strict approving majority.
    #[test]
    fn success_implies_majority(votes in prop::collection::vec(any::<bool>(), 0..20), required in 1u32..10) {
        let reveals: Vec<RevealedVote> = votes
            .iter()
            .enumerate()
            .map(|(i, approve)| RevealedVote {
                validator: Address::from_low_u64(i as u64 + 1),
                approve: *approve,
                burn_hash: Hash256::ZERO,
            })
            .collect();
        let tally = FinalizationEngine.tally(&reveals, votes.len() as u32, required);
        if tally.success {
            prop_assert!(tally.approvals * 2 > tally.reveals());
        }
        if votes.is_empty() {
            prop_assert!(!tally.success);
        }
    }

    /// A slash never exceeds the stake.
    #[test]
    fn slash_bounded_by_stake(stake in any::<u128>(), pct in 0u8..=100) {
        prop_assert!(slash_amount(stake, pct) <= stake);
    }
}
