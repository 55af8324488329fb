//! Cryptographic primitives for the validator consensus engine.
//!
//! - **Blake2b-256** for every protocol hash (commitments, entropy, draws)
//! - **Namehash** derivation of label nodes under a root node
//! - **Merkle** membership proofs with sorted-pair hashing

pub mod hash;
pub mod merkle;
pub mod namehash;

pub use hash::{blake2b_256, blake2b_256_multi, hash256};
pub use merkle::{merkle_leaf, merkle_root, merkle_proof, verify_merkle_proof};
pub use namehash::{label_hash, namehash, sub_node};
