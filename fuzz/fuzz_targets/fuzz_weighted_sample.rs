#![no_main]

use agij_types::{Address, Hash256};
use agij_validation::ValidatorSelector;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;

#[derive(Debug, Arbitrary)]
struct Input {
    seed: [u8; 32],
    stakes: Vec<u128>,
    count: u8,
}

fuzz_target!(|input: Input| {
    let pool: Vec<(Address, u128)> = input
        .stakes
        .iter()
        .take(512)
        .enumerate()
        .map(|(i, stake)| (Address::from_low_u64(i as u64 + 1), *stake))
        .collect();
    let count = usize::from(input.count);

    if let Some(picked) = ValidatorSelector.sample(&Hash256::new(input.seed), &pool, count) {
        let positive = pool.iter().filter(|(_, s)| *s > 0).count();
        assert_eq!(picked.len(), count.min(positive));
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), picked.len());
        for address in &picked {
            assert!(pool.iter().any(|(a, s)| a == address && *s > 0));
        }
    }
});
