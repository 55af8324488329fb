use proptest::prelude::*;

use agij_crypto::{merkle_leaf, merkle_proof, merkle_root, verify_merkle_proof};
use agij_types::Address;

proptest! {
    /// Every leaf of an arbitrary tree verifies against the tree root.
    #[test]
    fn all_leaves_verify(n in 1u64..64, pick in any::<prop::sample::Index>()) {
        let leaves: Vec<_> = (1..=n)
            .map(|i| merkle_leaf(&Address::from_low_u64(i), "label"))
            .collect();
        let root = merkle_root(&leaves);
        let idx = pick.index(leaves.len());
        let proof = merkle_proof(&leaves, idx).unwrap();
        prop_assert!(verify_merkle_proof(&proof, &root, &leaves[idx]));
    }

    /// A leaf outside the tree never verifies with another leaf's proof.
    #[test]
    fn outsider_never_verifies(n in 2u64..32, outsider in 1000u64..2000) {
        let leaves: Vec<_> = (1..=n)
            .map(|i| merkle_leaf(&Address::from_low_u64(i), ""))
            .collect();
        let root = merkle_root(&leaves);
        let proof = merkle_proof(&leaves, 0).unwrap();
        let foreign = merkle_leaf(&Address::from_low_u64(outsider), "");
        prop_assert!(!verify_merkle_proof(&proof, &root, &foreign));
    }
}
