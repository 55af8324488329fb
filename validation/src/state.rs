//! Per-job round state.

use agij_types::{Address, BlockNumber, Hash256, JobId, Timestamp};
use agij_vrf::EntropyRound;
use serde::{Deserialize, Serialize};

/// Selection progress for the current nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPhase {
    Unselected,
    /// Contributions accepted; target block not yet mined.
    AccumulatingEntropy,
    /// Target block mined; the next call resolves.
    TargetPending,
    Resolved,
}

/// Voting progress for the current nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotePhase {
    /// Validators selected, nobody has committed yet.
    Open,
    Committing,
    RevealOpen,
    /// Reveal window over, or finalized.
    Closed,
}

/// A reveal that matched its commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedVote {
    pub validator: Address,
    pub approve: bool,
    pub burn_hash: Hash256,
}

/// Everything tracked for one job at its current nonce.
///
/// A nonce reset replaces the whole round, so stale validator sets and
/// pending entropy never survive into the next nonce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRound {
    pub job_id: JobId,
    pub nonce: u64,
    pub entropy: Option<EntropyRound>,
    /// Distinct entropy contributors mixed into the resolved seed.
    pub entropy_contributors: usize,
    /// Selected committee, in draw order.
    pub validators: Vec<Address>,
    pub committee_size: u32,
    /// Set by the first commit and fixed afterwards.
    pub commit_deadline: Option<Timestamp>,
    pub reveal_deadline: Option<Timestamp>,
    pub reveals: Vec<RevealedVote>,
    /// `Some(success)` once finalized.
    pub outcome: Option<bool>,
}

impl JobRound {
    pub fn new(job_id: JobId, nonce: u64) -> Self {
        Self {
            job_id,
            nonce,
            entropy: None,
            entropy_contributors: 0,
            validators: Vec::new(),
            committee_size: 0,
            commit_deadline: None,
            reveal_deadline: None,
            reveals: Vec::new(),
            outcome: None,
        }
    }

    pub fn is_selected(&self) -> bool {
        !self.validators.is_empty()
    }

    pub fn is_validator(&self, address: &Address) -> bool {
        self.validators.contains(address)
    }

    pub fn is_finalized(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn has_revealed(&self, address: &Address) -> bool {
        self.reveals.iter().any(|r| r.validator == *address)
    }

    pub fn selection_phase(&self, current: BlockNumber) -> SelectionPhase {
        if self.is_selected() {
            return SelectionPhase::Resolved;
        }
        match &self.entropy {
            None => SelectionPhase::Unselected,
            Some(round) if round.target_reached(current) => SelectionPhase::TargetPending,
            Some(_) => SelectionPhase::AccumulatingEntropy,
        }
    }

    /// Windows are half-open: commits while `now < commit_deadline`, reveals
    /// while `commit_deadline <= now < reveal_deadline`.
    pub fn vote_phase(&self, now: Timestamp) -> VotePhase {
        if self.is_finalized() {
            return VotePhase::Closed;
        }
        match (self.commit_deadline, self.reveal_deadline) {
            (Some(commit), _) if now < commit => VotePhase::Committing,
            (Some(_), Some(reveal)) if now < reveal => VotePhase::RevealOpen,
            (Some(_), _) => VotePhase::Closed,
            (None, _) => VotePhase::Open,
        }
    }
}
