//! Nullable chain: deterministic block height, hashes, and time.

use agij_crypto::hash256;
use agij_types::{BlockNumber, Hash256, Timestamp};
use agij_vrf::ChainView;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

struct ChainState {
    height: BlockNumber,
    time: u64,
    pruned: HashSet<BlockNumber>,
}

/// A deterministic chain for testing.
///
/// Blocks are only mined and time only advances when you tell it to. Every
/// mined block has hash `H("null-block" || number)` unless pruned.
pub struct NullChain {
    state: Mutex<ChainState>,
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new(1, 1_000)
    }
}

impl NullChain {
    pub fn new(height: BlockNumber, time_secs: u64) -> Self {
        Self {
            state: Mutex::new(ChainState {
                height,
                time: time_secs,
                pruned: HashSet::new(),
            }),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ChainState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Mine `blocks` blocks without advancing time.
    pub fn mine(&self, blocks: u64) {
        self.with_state(|s| s.height += blocks);
    }

    /// Advance time by a number of seconds.
    pub fn advance_time(&self, secs: u64) {
        self.with_state(|s| s.time += secs);
    }

    /// Set the time to a specific value.
    pub fn set_time(&self, secs: u64) {
        self.with_state(|s| s.time = secs);
    }

    /// Forget a block's hash, as an archive-less node would.
    pub fn prune(&self, number: BlockNumber) {
        self.with_state(|s| {
            s.pruned.insert(number);
        });
    }

    /// The hash `block_hash` reports for a mined block.
    pub fn expected_hash(number: BlockNumber) -> Hash256 {
        hash256(&[b"null-block", &number.to_be_bytes()])
    }
}

impl ChainView for NullChain {
    fn block_number(&self) -> BlockNumber {
        self.with_state(|s| s.height)
    }

    fn block_hash(&self, number: BlockNumber) -> Option<Hash256> {
        self.with_state(|s| {
            (number < s.height && !s.pruned.contains(&number)).then(|| Self::expected_hash(number))
        })
    }

    fn timestamp(&self) -> Timestamp {
        self.with_state(|s| Timestamp::new(s.time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_mined_blocks_have_hashes() {
        let chain = NullChain::new(5, 0);
        assert!(chain.block_hash(4).is_some());
        assert!(chain.block_hash(5).is_none());
        chain.mine(1);
        assert_eq!(chain.block_hash(5), Some(NullChain::expected_hash(5)));
    }

    #[test]
    fn pruned_blocks_have_no_hash() {
        let chain = NullChain::new(5, 0);
        chain.prune(3);
        assert!(chain.block_hash(3).is_none());
    }

    #[test]
    fn time_only_moves_when_told() {
        let chain = NullChain::new(1, 100);
        assert_eq!(chain.timestamp(), Timestamp::new(100));
        chain.advance_time(5);
        assert_eq!(chain.timestamp(), Timestamp::new(105));
        chain.set_time(7);
        assert_eq!(chain.timestamp(), Timestamp::new(7));
    }
}
