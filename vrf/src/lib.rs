//! Randomness for validator selection.
//!
//! Selection seeds are never taken from a single party. Each round mixes
//! entropy from every distinct contributor, then anchors the result to the
//! hash of a block that did not exist when the first contribution was made:
//!
//! 1. The first contribution opens a round and fixes a target block
//!    `current + delay`.
//! 2. Further contributors mix in entropy until the target is mined.
//! 3. Once the target is mined, the accumulator is combined with the target
//!    block hash. Rounds with fewer than two contributors are discarded.

pub mod entropy;
pub mod error;

pub use entropy::{EntropyRound, MIN_CONTRIBUTORS};
pub use error::VrfError;

use agij_types::{BlockNumber, Hash256, Timestamp};

/// Read-only view of the ordering ledger.
///
/// Supplies the height, the hashes of already-mined blocks, and the current
/// block timestamp that every guard condition in the engine is evaluated against.
pub trait ChainView: Send + Sync {
    /// Height of the most recently mined block.
    fn block_number(&self) -> BlockNumber;

    /// Hash of a mined block, or `None` if it is in the future or pruned.
    fn block_hash(&self, number: BlockNumber) -> Option<Hash256>;

    /// Timestamp of the block currently being applied.
    fn timestamp(&self) -> Timestamp;
}

/// The output of a resolved entropy round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomOutput {
    /// Final 32-byte seed.
    pub value: Hash256,
    /// Block whose hash anchored the seed.
    pub target_block: BlockNumber,
    /// Distinct contributors mixed into the seed.
    pub contributors: usize,
}
