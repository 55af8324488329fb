//! Commit-reveal voting.

use crate::error::ValidationError;
use crate::state::{JobRound, RevealedVote};
use agij_crypto::hash256;
use agij_types::{Address, Hash256, JobId, Timestamp};

/// Hash a validator commits to before revealing its vote.
///
/// Binds the job, the round nonce, the vote, the burn receipt, a private
/// salt, and the job's spec hash, so a reveal cannot be replayed across
/// nonces or jobs.
pub fn commitment_hash(
    job_id: JobId,
    nonce: u64,
    approve: bool,
    burn_hash: &Hash256,
    salt: &Hash256,
    spec_hash: &Hash256,
) -> Hash256 {
    hash256(&[
        &job_id.to_be_bytes(),
        &nonce.to_be_bytes(),
        &[u8::from(approve)],
        burn_hash.as_bytes(),
        salt.as_bytes(),
        spec_hash.as_bytes(),
    ])
}

/// Phase guards and bookkeeping for commits and reveals.
pub struct CommitRevealCoordinator;

impl CommitRevealCoordinator {
    /// Check that `validator` may commit to `round` at `now`.
    pub fn check_commit(
        &self,
        round: &JobRound,
        validator: &Address,
        now: Timestamp,
    ) -> Result<(), ValidationError> {
        let job = round.job_id;
        if round.is_finalized() {
            return Err(ValidationError::CommitPhaseClosed(job));
        }
        if !round.is_validator(validator) {
            return Err(ValidationError::NotValidator {
                job,
                validator: *validator,
            });
        }
        match round.commit_deadline {
            Some(deadline) if now >= deadline => Err(ValidationError::CommitPhaseClosed(job)),
            _ => Ok(()),
        }
    }

    /// Fix both deadlines on the first commit. Later calls leave them alone.
    pub fn open_windows(
        &self,
        round: &mut JobRound,
        now: Timestamp,
        commit_window_secs: u64,
        reveal_window_secs: u64,
    ) {
        if round.commit_deadline.is_some() {
            return;
        }
        let commit_deadline = now.plus(commit_window_secs);
        round.commit_deadline = Some(commit_deadline);
        round.reveal_deadline = Some(commit_deadline.plus(reveal_window_secs));
    }

    /// Check that the reveal window is open for the round.
    pub fn check_reveal_window(
        &self,
        round: &JobRound,
        validator: &Address,
        now: Timestamp,
    ) -> Result<(), ValidationError> {
        let job = round.job_id;
        if round.is_finalized() {
            return Err(ValidationError::RevealPhaseClosed(job));
        }
        let (Some(commit_deadline), Some(reveal_deadline)) =
            (round.commit_deadline, round.reveal_deadline)
        else {
            return Err(ValidationError::NotCommitted {
                job,
                validator: *validator,
            });
        };
        if now < commit_deadline {
            return Err(ValidationError::CommitPhaseOpen(job));
        }
        if now >= reveal_deadline {
            return Err(ValidationError::RevealPhaseClosed(job));
        }
        Ok(())
    }

    /// Compare a reveal against the stored commitment and record it.
    #[allow(clippy::too_many_arguments)]
    pub fn accept_reveal(
        &self,
        round: &mut JobRound,
        validator: &Address,
        stored: &Hash256,
        approve: bool,
        burn_hash: Hash256,
        salt: &Hash256,
        spec_hash: &Hash256,
    ) -> Result<(), ValidationError> {
        let expected = commitment_hash(round.job_id, round.nonce, approve, &burn_hash, salt, spec_hash);
        if expected != *stored {
            return Err(ValidationError::InvalidReveal {
                job: round.job_id,
                validator: *validator,
            });
        }
        round.reveals.push(RevealedVote {
            validator: *validator,
            approve,
            burn_hash,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn selected_round() -> JobRound {
        let mut round = JobRound::new(JobId::new(1), 0);
        round.validators = vec![addr(1), addr(2), addr(3)];
        round.committee_size = 3;
        round
    }

    fn commit_at(round: &mut JobRound, who: Address, now: u64) -> Result<(), ValidationError> {
        CommitRevealCoordinator.check_commit(round, &who, Timestamp::new(now))?;
        CommitRevealCoordinator.open_windows(round, Timestamp::new(now), 60, 60);
        Ok(())
    }

    #[test]
    fn first_commit_fixes_deadlines() {
        let mut round = selected_round();
        CommitRevealCoordinator.open_windows(&mut round, Timestamp::new(1000), 60, 30);
        assert_eq!(round.commit_deadline, Some(Timestamp::new(1060)));
        assert_eq!(round.reveal_deadline, Some(Timestamp::new(1090)));

        CommitRevealCoordinator.open_windows(&mut round, Timestamp::new(1059), 600, 600);
        assert_eq!(round.commit_deadline, Some(Timestamp::new(1060)));
    }

    #[test]
    fn commit_after_deadline_is_closed() {
        let mut round = selected_round();
        commit_at(&mut round, addr(1), 0).unwrap();
        let err = commit_at(&mut round, addr(2), 60).unwrap_err();
        assert!(matches!(err, ValidationError::CommitPhaseClosed(_)));
    }

    #[test]
    fn non_member_cannot_commit() {
        let mut round = selected_round();
        let err = commit_at(&mut round, addr(9), 0).unwrap_err();
        assert!(matches!(err, ValidationError::NotValidator { .. }));
        assert!(round.commit_deadline.is_none());
    }

    #[test]
    fn reveal_window_guards() {
        let mut round = selected_round();
        commit_at(&mut round, addr(1), 0).unwrap();
        let early = CommitRevealCoordinator.check_reveal_window(&round, &addr(1), Timestamp::new(59));
        assert!(matches!(early, Err(ValidationError::CommitPhaseOpen(_))));
        assert!(CommitRevealCoordinator
            .check_reveal_window(&round, &addr(1), Timestamp::new(60))
            .is_ok());
        let late = CommitRevealCoordinator.check_reveal_window(&round, &addr(1), Timestamp::new(120));
        assert!(matches!(late, Err(ValidationError::RevealPhaseClosed(_))));
    }

    #[test]
    fn reveal_must_match_every_field() {
        let burn = Hash256::new([1; 32]);
        let salt = Hash256::new([2; 32]);
        let spec = Hash256::new([3; 32]);
        let mut round = selected_round();
        let stored = commitment_hash(round.job_id, round.nonce, true, &burn, &salt, &spec);

        let wrong_vote =
            CommitRevealCoordinator.accept_reveal(&mut round, &addr(1), &stored, false, burn, &salt, &spec);
        assert!(matches!(wrong_vote, Err(ValidationError::InvalidReveal { .. })));
        let wrong_salt = CommitRevealCoordinator.accept_reveal(
            &mut round,
            &addr(1),
            &stored,
            true,
            burn,
            &Hash256::new([9; 32]),
            &spec,
        );
        assert!(wrong_salt.is_err());
        assert!(round.reveals.is_empty());

        CommitRevealCoordinator
            .accept_reveal(&mut round, &addr(1), &stored, true, burn, &salt, &spec)
            .unwrap();
        assert_eq!(round.reveals.len(), 1);
    }

    #[test]
    fn nonce_is_bound_into_commitment() {
        let h = Hash256::new([5; 32]);
        let a = commitment_hash(JobId::new(1), 0, true, &h, &h, &h);
        let b = commitment_hash(JobId::new(1), 1, true, &h, &h, &h);
        assert_ne!(a, b);
    }
}
