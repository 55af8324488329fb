//! Tallying revealed votes and settling stakes.

use crate::state::RevealedVote;
use agij_stake::StakeLedger;
use agij_types::{Address, Role};
use serde::{Deserialize, Serialize};

/// Counted reveals for one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub approvals: u32,
    pub rejections: u32,
    /// Outcome written to the job registry.
    pub success: bool,
    /// Side holding a strict majority of reveals; `None` on a tie or no reveals.
    pub majority: Option<bool>,
}

impl Tally {
    pub fn reveals(&self) -> u32 {
        self.approvals + self.rejections
    }
}

/// Stake and reputation changes produced by a tally.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settlement {
    /// Minority voters and the stake each loses.
    pub slashes: Vec<(Address, u128)>,
    /// Majority voters, each credited one reputation point.
    pub rewards: Vec<Address>,
}

/// Majority-rule finalization over revealed votes only.
pub struct FinalizationEngine;

impl FinalizationEngine {
    /// Count reveals. Validators who committed but never revealed are not
    /// counted on either side.
    ///
    /// Success requires a strict approving majority and at least
    /// `min(required_approvals, committee_size)` approvals.
    pub fn tally(&self, reveals: &[RevealedVote], committee_size: u32, required_approvals: u32) -> Tally {
        let approvals = reveals.iter().filter(|r| r.approve).count() as u32;
        let rejections = reveals.len() as u32 - approvals;
        let total = approvals + rejections;

        let majority = if approvals * 2 > total {
            Some(true)
        } else if rejections * 2 > total {
            Some(false)
        } else {
            None
        };
        let quorum = required_approvals.min(committee_size);
        let success = majority == Some(true) && approvals >= quorum;

        Tally {
            approvals,
            rejections,
            success,
            majority,
        }
    }

    /// Plan slashes for the minority and rewards for the majority.
    ///
    /// Nothing is settled on a tie, or when an approving majority failed the
    /// approval quorum and the outcome went the other way. Stakes are read
    /// here, before anything is applied. Minority voters whose computed slash
    /// is zero are left out.
    pub fn settle(
        &self,
        reveals: &[RevealedVote],
        tally: &Tally,
        stake: &dyn StakeLedger,
        slash_pct: u8,
    ) -> Settlement {
        let Some(majority) = tally.majority.filter(|side| *side == tally.success) else {
            return Settlement::default();
        };
        let mut settlement = Settlement::default();
        for reveal in reveals {
            if reveal.approve == majority {
                settlement.rewards.push(reveal.validator);
            } else {
                let amount = slash_amount(stake.stake_of(&reveal.validator, Role::Validator), slash_pct);
                if amount > 0 {
                    settlement.slashes.push((reveal.validator, amount));
                }
            }
        }
        settlement
    }
}

/// `stake * pct / 100`, without overflowing for large stakes.
pub fn slash_amount(stake: u128, pct: u8) -> u128 {
    let pct = u128::from(pct.min(100));
    match stake.checked_mul(pct) {
        Some(product) => product / 100,
        None => stake / 100 * pct,
    }
}
