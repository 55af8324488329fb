//! Per-job entropy rounds.

use crate::{ChainView, RandomOutput, VrfError};
use agij_crypto::hash256;
use agij_types::{Address, BlockNumber, Hash256};
use serde::{Deserialize, Serialize};

/// Distinct contributors required before a round may resolve.
pub const MIN_CONTRIBUTORS: usize = 2;

/// Entropy accumulated for one job while its target block is pending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntropyRound {
    /// Distinct contributors, in arrival order.
    contributors: Vec<Address>,
    accumulator: Hash256,
    target_block: BlockNumber,
}

impl EntropyRound {
    /// Open a round with its first contribution. The target block is
    /// `current + delay`.
    pub fn open(contributor: Address, entropy: u128, current: BlockNumber, delay: u64) -> Self {
        let mut round = Self {
            contributors: Vec::new(),
            accumulator: Hash256::ZERO,
            target_block: current.saturating_add(delay),
        };
        round.mix(contributor, entropy);
        round
    }

    fn mix(&mut self, contributor: Address, entropy: u128) {
        self.accumulator = hash256(&[
            self.accumulator.as_bytes(),
            contributor.as_bytes(),
            &entropy.to_be_bytes(),
        ]);
        self.contributors.push(contributor);
    }

    /// Mix in a contribution. Repeat contributors are ignored.
    ///
    /// Returns whether the contribution was counted.
    pub fn contribute(&mut self, contributor: Address, entropy: u128) -> bool {
        if self.contributors.contains(&contributor) {
            tracing::debug!(%contributor, target_block = self.target_block, "repeat entropy contribution ignored");
            return false;
        }
        self.mix(contributor, entropy);
        tracing::debug!(
            %contributor,
            target_block = self.target_block,
            contributors = self.contributors.len(),
            "entropy contributed"
        );
        true
    }

    pub fn target_block(&self) -> BlockNumber {
        self.target_block
    }

    pub fn contributor_count(&self) -> usize {
        self.contributors.len()
    }

    pub fn contributors(&self) -> &[Address] {
        &self.contributors
    }

    /// Whether the target block has been mined, i.e. its hash is fixed.
    pub fn target_reached(&self, current: BlockNumber) -> bool {
        current > self.target_block
    }

    /// Combine the accumulator with the target block hash.
    ///
    /// Fails if the target is not yet mined, its hash is unavailable, or fewer
    /// than [`MIN_CONTRIBUTORS`] distinct parties contributed.
    pub fn resolve(&self, chain: &dyn ChainView) -> Result<RandomOutput, VrfError> {
        let current = chain.block_number();
        if !self.target_reached(current) {
            return Err(VrfError::TargetNotReached {
                target: self.target_block,
                current,
            });
        }
        if self.contributors.len() < MIN_CONTRIBUTORS {
            return Err(VrfError::InsufficientContributors {
                have: self.contributors.len(),
                need: MIN_CONTRIBUTORS,
            });
        }
        let anchor = chain.block_hash(self.target_block).ok_or_else(|| {
            tracing::debug!(target_block = self.target_block, "target block hash unavailable");
            VrfError::MissingBlockHash(self.target_block)
        })?;
        let value = hash256(&[
            self.accumulator.as_bytes(),
            anchor.as_bytes(),
            &self.target_block.to_be_bytes(),
        ]);
        Ok(RandomOutput {
            value,
            target_block: self.target_block,
            contributors: self.contributors.len(),
        })
    }
}
