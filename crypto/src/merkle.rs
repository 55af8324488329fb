//! Merkle membership proofs.
//!
//! Interior nodes hash the sorted pair of their children, so proofs carry
//! sibling hashes only (no left/right flags). A single-leaf tree has the
//! leaf itself as root and an empty proof.

use crate::hash::hash256;
use crate::namehash::label_hash;
use agij_types::{Address, Hash256};

/// Leaf committed to by an allow-list tree: `H(address || H(label))`.
pub fn merkle_leaf(address: &Address, label: &str) -> Hash256 {
    let label = label_hash(label);
    hash256(&[address.as_bytes(), label.as_bytes()])
}

fn hash_pair(a: &Hash256, b: &Hash256) -> Hash256 {
    if a <= b {
        hash256(&[a.as_bytes(), b.as_bytes()])
    } else {
        hash256(&[b.as_bytes(), a.as_bytes()])
    }
}

/// Check that `leaf` is a member of the tree with `root`.
pub fn verify_merkle_proof(proof: &[Hash256], root: &Hash256, leaf: &Hash256) -> bool {
    let computed = proof.iter().fold(*leaf, |acc, sibling| hash_pair(&acc, sibling));
    computed == *root
}

fn next_level(level: &[Hash256]) -> Vec<Hash256> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [a, b] => hash_pair(a, b),
            [a] => *a,
            _ => unreachable!("chunks(2) yields one or two items"),
        })
        .collect()
}

/// Root of the tree over `leaves`. An odd node at any level is promoted unchanged.
///
/// Returns `Hash256::ZERO` for an empty leaf set.
pub fn merkle_root(leaves: &[Hash256]) -> Hash256 {
    if leaves.is_empty() {
        return Hash256::ZERO;
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level[0]
}

/// Sibling path for the leaf at `index`, or `None` if out of range.
pub fn merkle_proof(leaves: &[Hash256], index: usize) -> Option<Vec<Hash256>> {
    if index >= leaves.len() {
        return None;
    }
    let mut proof = Vec::new();
    let mut level = leaves.to_vec();
    let mut idx = index;
    while level.len() > 1 {
        let sibling = idx ^ 1;
        if sibling < level.len() {
            proof.push(level[sibling]);
        }
        level = next_level(&level);
        idx /= 2;
    }
    Some(proof)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(n: u64) -> Vec<Hash256> {
        (1..=n)
            .map(|i| merkle_leaf(&Address::from_low_u64(i), ""))
            .collect()
    }

    #[test]
    fn single_leaf_root_is_leaf() {
        let l = leaves(1);
        assert_eq!(merkle_root(&l), l[0]);
        assert!(verify_merkle_proof(&[], &l[0], &l[0]));
    }

    #[test]
    fn every_leaf_proves_membership() {
        let l = leaves(7);
        let root = merkle_root(&l);
        for i in 0..l.len() {
            let proof = merkle_proof(&l, i).unwrap();
            assert!(verify_merkle_proof(&proof, &root, &l[i]), "leaf {i}");
        }
    }

    #[test]
    fn wrong_label_fails() {
        let addr = Address::from_low_u64(9);
        let root = merkle_leaf(&addr, "a");
        assert!(!verify_merkle_proof(&[], &root, &merkle_leaf(&addr, "b")));
    }

    #[test]
    fn bogus_sibling_fails() {
        let l = leaves(4);
        let root = merkle_root(&l);
        let bad = vec![label_hash("bad")];
        assert!(!verify_merkle_proof(&bad, &root, &l[0]));
    }

    #[test]
    fn proof_index_out_of_range() {
        assert!(merkle_proof(&leaves(3), 3).is_none());
    }
}
