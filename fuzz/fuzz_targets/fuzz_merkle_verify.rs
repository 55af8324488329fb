#![no_main]

use agij_crypto::{merkle_leaf, merkle_proof, merkle_root, verify_merkle_proof};
use agij_types::{Address, Hash256};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    members: Vec<([u8; 20], String)>,
    index: usize,
    bogus_proof: Vec<[u8; 32]>,
    bogus_root: [u8; 32],
}

fuzz_target!(|input: Input| {
    if input.members.is_empty() || input.members.len() > 256 {
        return;
    }
    let leaves: Vec<Hash256> = input
        .members
        .iter()
        .map(|(bytes, label)| merkle_leaf(&Address::new(*bytes), label))
        .collect();
    let root = merkle_root(&leaves);

    // Every generated proof must verify.
    let index = input.index % leaves.len();
    let proof = merkle_proof(&leaves, index).expect("index in range");
    assert!(verify_merkle_proof(&proof, &root, &leaves[index]));

    // Arbitrary proofs must never panic.
    let bogus: Vec<Hash256> = input.bogus_proof.into_iter().map(Hash256::new).collect();
    let _ = verify_merkle_proof(&bogus, &Hash256::new(input.bogus_root), &leaves[index]);
});
