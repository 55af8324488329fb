//! Validation module: connects selection, commit-reveal, finalization, and
//! identity gating into the per-job validation workflow.
//!
//! Every public operation is one state transition. Each validates everything
//! it needs before mutating, so a returned error leaves the module unchanged
//! apart from authorization-cache memos and diagnostic events.

use crate::commit_reveal::CommitRevealCoordinator;
use crate::error::ValidationError;
use crate::events::{SelectionResetReason, ValidationEvent};
use crate::finalize::FinalizationEngine;
use crate::jobs::JobRegistry;
use crate::policy::PolicyAcknowledgements;
use crate::selection::ValidatorSelector;
use crate::snapshot::ModuleSnapshot;
use crate::state::{JobRound, SelectionPhase, VotePhase};
use agij_identity::{
    AttestationService, AuthorizationCache, ConfigBatch, ConfigSummary, IdentityError,
    IdentityRegistry, NameService, VerificationOutcome,
};
use agij_stake::{ReputationLedger, StakeError, StakeLedger};
use agij_types::{
    Address, BlockNumber, Hash256, Job, JobId, Role, SelectionStrategy, Timestamp, ValidationParams,
};
use agij_vrf::{ChainView, EntropyRound, RandomOutput, VrfError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// External services the module reads from and writes to.
#[derive(Clone)]
pub struct Collaborators {
    pub jobs: Arc<dyn JobRegistry>,
    pub stake: Arc<dyn StakeLedger>,
    pub reputation: Arc<dyn ReputationLedger>,
    pub chain: Arc<dyn ChainView>,
}

/// The validation engine for all jobs.
pub struct ValidationModule {
    pub selector: ValidatorSelector,
    pub coordinator: CommitRevealCoordinator,
    pub finalizer: FinalizationEngine,
    governance: Address,
    params: ValidationParams,
    jobs: Arc<dyn JobRegistry>,
    stake: Arc<dyn StakeLedger>,
    reputation: Arc<dyn ReputationLedger>,
    chain: Arc<dyn ChainView>,
    identity: IdentityRegistry,
    cache: AuthorizationCache,
    policy: PolicyAcknowledgements,
    /// Acknowledgements are only required once governance turns this on.
    policy_enforced: bool,
    paused: bool,
    pool: Vec<Address>,
    pool_rotation: u64,
    rounds: HashMap<JobId, JobRound>,
    commitments: HashMap<(JobId, Address, u64), Hash256>,
    /// Pending events for the node to process.
    pending_events: Vec<ValidationEvent>,
}

impl ValidationModule {
    pub fn new(
        governance: Address,
        params: ValidationParams,
        collaborators: Collaborators,
    ) -> Result<Self, ValidationError> {
        if governance.is_zero() {
            return Err(ValidationError::ZeroAddress("governance"));
        }
        params.validate()?;
        let identity = IdentityRegistry::new().with_reputation(Arc::clone(&collaborators.reputation));
        let cache = AuthorizationCache::new(params.auth_cache_duration_secs);
        Ok(Self {
            selector: ValidatorSelector,
            coordinator: CommitRevealCoordinator,
            finalizer: FinalizationEngine,
            governance,
            params,
            jobs: collaborators.jobs,
            stake: collaborators.stake,
            reputation: collaborators.reputation,
            chain: collaborators.chain,
            identity,
            cache,
            policy: PolicyAcknowledgements::new(),
            policy_enforced: false,
            paused: false,
            pool: Vec::new(),
            pool_rotation: 0,
            rounds: HashMap::new(),
            commitments: HashMap::new(),
            pending_events: Vec::new(),
        })
    }

    /// Rebuild a module from a snapshot. Identity service handles are not
    /// part of the snapshot and are reattached from the arguments.
    pub fn restore(
        snapshot: ModuleSnapshot,
        collaborators: Collaborators,
        name_service: Option<Arc<dyn NameService>>,
        attestations: Option<Arc<dyn AttestationService>>,
    ) -> Result<Self, ValidationError> {
        let mut module = Self::new(snapshot.governance, snapshot.params, collaborators)?;
        let mut identity = IdentityRegistry::restore(snapshot.identity)
            .with_reputation(Arc::clone(&module.reputation));
        identity.attach_services(name_service, attestations);
        module.identity = identity;
        module.cache = snapshot.cache;
        module.policy = snapshot.policy;
        module.policy_enforced = snapshot.policy_enforced;
        module.paused = snapshot.paused;
        module.pool = snapshot.pool;
        module.pool_rotation = snapshot.pool_rotation;
        module.rounds = snapshot
            .rounds
            .into_iter()
            .map(|round| (round.job_id, round))
            .collect();
        module.commitments = snapshot
            .commitments
            .into_iter()
            .map(|(job, validator, nonce, hash)| ((job, validator, nonce), hash))
            .collect();
        Ok(module)
    }

    /// Capture all persistent state, ordered for stable encoding.
    pub fn snapshot(&self) -> ModuleSnapshot {
        let mut rounds: Vec<JobRound> = self.rounds.values().cloned().collect();
        rounds.sort_by_key(|round| round.job_id);
        let mut commitments: Vec<(JobId, Address, u64, Hash256)> = self
            .commitments
            .iter()
            .map(|((job, validator, nonce), hash)| (*job, *validator, *nonce, *hash))
            .collect();
        commitments.sort_by_key(|(job, validator, nonce, _)| (*job, *validator, *nonce));
        ModuleSnapshot {
            governance: self.governance,
            params: self.params.clone(),
            pool: self.pool.clone(),
            rounds,
            commitments,
            identity: self.identity.config().clone(),
            cache: self.cache.clone(),
            policy: self.policy.clone(),
            policy_enforced: self.policy_enforced,
            paused: self.paused,
            pool_rotation: self.pool_rotation,
        }
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Entry point for the job registry when work is submitted.
    pub fn start(
        &mut self,
        caller: Address,
        job: JobId,
        entropy: u128,
    ) -> Result<Option<Vec<Address>>, ValidationError> {
        self.ensure_not_paused()?;
        if caller != self.jobs.address() {
            return Err(ValidationError::Unauthorized(caller));
        }
        self.select_validators(caller, job, entropy)
    }

    /// Contribute entropy toward the job's committee, or resolve it once the
    /// target block is mined.
    ///
    /// Returns the committee when this call resolved it. Entropy passed on
    /// the resolving call is ignored.
    pub fn select_validators(
        &mut self,
        caller: Address,
        job: JobId,
        entropy: u128,
    ) -> Result<Option<Vec<Address>>, ValidationError> {
        self.ensure_not_paused()?;
        self.submitted_job(job)?;
        let current = self.chain.block_number();
        let delay = self.params.selection_delay_blocks;
        let round = self
            .rounds
            .entry(job)
            .or_insert_with(|| JobRound::new(job, 0));
        if round.is_selected() {
            return Err(ValidationError::ValidatorsAlreadySelected(job));
        }

        if round.entropy.is_none() {
            let opened = EntropyRound::open(caller, entropy, current, delay);
            let target_block = opened.target_block();
            round.entropy = Some(opened);
            tracing::info!(%job, contributor = %caller, target_block, "entropy round opened");
            self.pending_events.push(ValidationEvent::EntropyContributed {
                job,
                contributor: caller,
                counted: true,
                target_block,
            });
            return Ok(None);
        }
        if let Some(pending) = round.entropy.as_mut() {
            if !pending.target_reached(current) {
                let counted = pending.contribute(caller, entropy);
                let target_block = pending.target_block();
                self.pending_events.push(ValidationEvent::EntropyContributed {
                    job,
                    contributor: caller,
                    counted,
                    target_block,
                });
                return Ok(None);
            }
        }

        self.resolve_selection(job)
    }

    fn resolve_selection(&mut self, job: JobId) -> Result<Option<Vec<Address>>, ValidationError> {
        let (nonce, resolved) = match self.rounds.get(&job) {
            Some(JobRound {
                nonce,
                entropy: Some(pending),
                ..
            }) => (*nonce, pending.resolve(self.chain.as_ref())),
            _ => return Ok(None),
        };

        let reason = match resolved {
            Ok(output) => return self.install_committee(job, nonce, output),
            Err(VrfError::TargetNotReached { .. }) => return Ok(None),
            Err(VrfError::MissingBlockHash(number)) => SelectionResetReason::MissingBlockHash(number),
            Err(VrfError::InsufficientContributors { have, .. }) => {
                SelectionResetReason::TooFewContributors { have }
            }
        };
        if let Some(round) = self.rounds.get_mut(&job) {
            round.entropy = None;
        }
        tracing::warn!(%job, nonce, ?reason, "selection reset");
        self.pending_events
            .push(ValidationEvent::SelectionReset { job, nonce, reason });
        Ok(None)
    }

    fn install_committee(
        &mut self,
        job: JobId,
        nonce: u64,
        output: RandomOutput,
    ) -> Result<Option<Vec<Address>>, ValidationError> {
        let window = self.selector.window(
            self.params.selection_strategy,
            &output.value,
            self.pool.len(),
            self.params.validator_pool_sample_size as usize,
            self.pool_rotation,
        );
        let eligible = self.eligible_validators(&window.indices);
        let committee = self.params.validators_per_job.min(eligible.len() as u32);
        if committee < self.params.min_validators || committee > self.params.max_validators {
            return Err(ValidationError::InsufficientValidators {
                eligible: eligible.len(),
                min: self.params.min_validators,
                max: self.params.max_validators,
            });
        }
        let validators = self
            .selector
            .sample(&output.value, &eligible, committee as usize)
            .ok_or(ValidationError::Stake(StakeError::Overflow))?;

        let round = self
            .rounds
            .get_mut(&job)
            .ok_or(ValidationError::JobNotFound(job))?;
        round.validators = validators.clone();
        round.committee_size = validators.len() as u32;
        round.entropy_contributors = output.contributors;
        round.entropy = None;

        if let Some(rotation) = window.rotation {
            self.pool_rotation = rotation;
            tracing::debug!(%job, rotation, "validator pool rotation updated");
            self.pending_events
                .push(ValidationEvent::ValidatorPoolRotationUpdated { job, rotation });
        }

        tracing::info!(
            %job,
            nonce,
            committee = validators.len(),
            contributors = output.contributors,
            "validators selected"
        );
        self.pending_events.push(ValidationEvent::ValidatorsSelected {
            job,
            nonce,
            validators: validators.clone(),
        });
        Ok(Some(validators))
    }

    /// Window members that are not blacklisted, pass identity checks, and
    /// hold validator stake, in window order.
    fn eligible_validators(&mut self, window: &[usize]) -> Vec<(Address, u128)> {
        let now = self.chain.timestamp();
        let candidates: Vec<Address> = window
            .iter()
            .filter_map(|index| self.pool.get(*index).copied())
            .collect();
        let mut eligible = Vec::with_capacity(candidates.len());
        for address in candidates {
            let stake = self.stake.stake_of(&address, Role::Validator);
            if stake == 0 {
                continue;
            }
            if self.is_verified_cached(Role::Validator, &address, "", &[], now) {
                eligible.push((address, stake));
            }
        }
        eligible
    }

    // ── Commit-reveal ────────────────────────────────────────────────────

    /// Store a concealed vote for the caller.
    pub fn commit(
        &mut self,
        caller: Address,
        job: JobId,
        commitment: Hash256,
        label: &str,
        proof: &[Hash256],
    ) -> Result<(), ValidationError> {
        self.ensure_not_paused()?;
        self.ensure_policy(&caller)?;
        let now = self.chain.timestamp();
        let round = self.rounds.get(&job).ok_or(ValidationError::NotValidator {
            job,
            validator: caller,
        })?;
        self.coordinator.check_commit(round, &caller, now)?;
        let nonce = round.nonce;

        let outcome = self.verify_validator(job, &caller, label, proof)?;
        let key = (job, caller, nonce);
        if self.commitments.contains_key(&key) {
            return Err(ValidationError::AlreadyCommitted {
                job,
                validator: caller,
            });
        }

        let (commit_window, reveal_window) = (self.params.commit_window_secs, self.params.reveal_window_secs);
        let round = self
            .rounds
            .get_mut(&job)
            .ok_or(ValidationError::JobNotFound(job))?;
        self.coordinator
            .open_windows(round, now, commit_window, reveal_window);
        self.commitments.insert(key, commitment);

        tracing::info!(%job, validator = %caller, nonce, "validation committed");
        self.push_identity_verified(job, caller, label, &outcome);
        self.pending_events.push(ValidationEvent::ValidationCommitted {
            job,
            validator: caller,
            commitment,
            nonce,
        });
        Ok(())
    }

    /// Disclose a committed vote. The recomputed hash must equal the stored
    /// commitment exactly.
    #[allow(clippy::too_many_arguments)]
    pub fn reveal(
        &mut self,
        caller: Address,
        job: JobId,
        approve: bool,
        burn_hash: Hash256,
        salt: Hash256,
        label: &str,
        proof: &[Hash256],
    ) -> Result<(), ValidationError> {
        self.ensure_not_paused()?;
        self.ensure_policy(&caller)?;
        let now = self.chain.timestamp();
        let round = self.rounds.get(&job).ok_or(ValidationError::NotCommitted {
            job,
            validator: caller,
        })?;
        self.coordinator.check_reveal_window(round, &caller, now)?;
        let nonce = round.nonce;

        let outcome = self.verify_validator(job, &caller, label, proof)?;
        let key = (job, caller, nonce);
        let stored = *self
            .commitments
            .get(&key)
            .ok_or(ValidationError::NotCommitted {
                job,
                validator: caller,
            })?;
        let spec_hash = self
            .jobs
            .job(job)
            .map(|record| record.spec_hash)
            .ok_or(ValidationError::JobNotFound(job))?;

        let round = self
            .rounds
            .get_mut(&job)
            .ok_or(ValidationError::JobNotFound(job))?;
        self.coordinator
            .accept_reveal(round, &caller, &stored, approve, burn_hash, &salt, &spec_hash)?;
        self.commitments.remove(&key);

        tracing::info!(%job, validator = %caller, nonce, approve, "validation revealed");
        self.push_identity_verified(job, caller, label, &outcome);
        self.pending_events.push(ValidationEvent::ValidationRevealed {
            job,
            validator: caller,
            approve,
            burn_hash,
            nonce,
        });
        Ok(())
    }

    // ── Finalization ─────────────────────────────────────────────────────

    /// Tally reveals, settle stakes, and record the outcome.
    pub fn finalize(&mut self, job: JobId) -> Result<bool, ValidationError> {
        let now = self.chain.timestamp();
        let round = self.rounds.get(&job).ok_or(ValidationError::RevealPending(job))?;
        if round.is_finalized() {
            return Err(ValidationError::AlreadyFinalized(job));
        }
        match round.reveal_deadline {
            Some(deadline) if now >= deadline => {}
            _ => return Err(ValidationError::RevealPending(job)),
        }
        if !self.jobs.burn_confirmed(job) {
            return Err(ValidationError::BurnEvidenceMissing(job));
        }

        let nonce = round.nonce;
        let tally = self
            .finalizer
            .tally(&round.reveals, round.committee_size, self.params.required_approvals);
        let settlement =
            self.finalizer
                .settle(&round.reveals, &tally, self.stake.as_ref(), self.params.slash_pct);

        if !settlement.slashes.is_empty() {
            self.stake.slash_batch(Role::Validator, &settlement.slashes)?;
        }
        for validator in &settlement.rewards {
            self.reputation.add(validator, 1);
        }
        self.jobs.record_outcome(job, tally.success);
        self.close_round(job, tally.success);

        for (validator, amount) in settlement.slashes {
            tracing::info!(%job, %validator, amount, "validator slashed");
            self.pending_events.push(ValidationEvent::ValidatorSlashed {
                job,
                validator,
                amount,
            });
        }
        for validator in settlement.rewards {
            self.pending_events
                .push(ValidationEvent::ValidatorRewarded { job, validator });
        }
        tracing::info!(
            %job,
            nonce,
            success = tally.success,
            approvals = tally.approvals,
            rejections = tally.rejections,
            "validation finalized"
        );
        self.pending_events.push(ValidationEvent::ValidationFinalized {
            job,
            nonce,
            success: tally.success,
            approvals: tally.approvals,
            rejections: tally.rejections,
            forced: false,
        });
        Ok(tally.success)
    }

    /// Close a round without slashing or reputation changes.
    ///
    /// Allowed once the reveal window closed if burn evidence is missing,
    /// otherwise only after the reveal deadline plus the grace period. The
    /// job is recorded as failed.
    pub fn force_finalize(&mut self, job: JobId) -> Result<(), ValidationError> {
        let now = self.chain.timestamp();
        let round = self.rounds.get(&job).ok_or(ValidationError::RevealPending(job))?;
        if round.is_finalized() {
            return Err(ValidationError::AlreadyFinalized(job));
        }
        let deadline = match round.reveal_deadline {
            Some(deadline) if now >= deadline => deadline,
            _ => return Err(ValidationError::RevealPending(job)),
        };
        let burn_confirmed = self.jobs.burn_confirmed(job);
        if burn_confirmed && now < deadline.plus(self.params.force_finalize_grace_secs) {
            return Err(ValidationError::ForceFinalizeTooEarly(job));
        }

        let nonce = round.nonce;
        let approvals = round.reveals.iter().filter(|r| r.approve).count() as u32;
        let rejections = round.reveals.len() as u32 - approvals;
        self.jobs.record_outcome(job, false);
        self.close_round(job, false);

        tracing::warn!(%job, nonce, burn_confirmed, "validation force-finalized");
        self.pending_events.push(ValidationEvent::ValidationFinalized {
            job,
            nonce,
            success: false,
            approvals,
            rejections,
            forced: true,
        });
        Ok(())
    }

    fn close_round(&mut self, job: JobId, success: bool) {
        if let Some(round) = self.rounds.get_mut(&job) {
            round.outcome = Some(success);
        }
        self.commitments.retain(|(committed_job, _, _), _| *committed_job != job);
    }

    /// Advance the job's nonce, discarding its committee, commitments, and any
    /// pending entropy round.
    pub fn reset_job_nonce(&mut self, caller: Address, job: JobId) -> Result<u64, ValidationError> {
        self.ensure_governance(&caller)?;
        let nonce = self.job_nonce(job) + 1;
        self.rounds.insert(job, JobRound::new(job, nonce));
        self.commitments.retain(|(committed_job, _, _), _| *committed_job != job);
        tracing::info!(%job, nonce, "job nonce reset");
        self.pending_events
            .push(ValidationEvent::NonceReset { job, nonce });
        Ok(nonce)
    }

    // ── Identity ─────────────────────────────────────────────────────────

    /// Agent authorization through the cache, falling back to a full
    /// verification whose success is cached.
    pub fn is_authorized_agent_cached(
        &mut self,
        agent: Address,
        label: &str,
        proof: &[Hash256],
    ) -> Result<(), IdentityError> {
        let now = self.chain.timestamp();
        if self.is_verified_cached(Role::Agent, &agent, label, proof, now) {
            Ok(())
        } else {
            Err(IdentityError::NotAuthorizedAgent(agent))
        }
    }

    fn is_verified_cached(
        &mut self,
        role: Role,
        address: &Address,
        label: &str,
        proof: &[Hash256],
        now: Timestamp,
    ) -> bool {
        if self.reputation.is_blacklisted(address) {
            return false;
        }
        self.cache.sync_version(self.identity.version());
        let hit = self.cache.lookup(role, address, now) == Some(true);
        tracing::debug!(%role, %address, hit, "authorization cache lookup");
        self.pending_events.push(ValidationEvent::AuthorizationLookup {
            role,
            address: *address,
            hit,
        });
        if hit {
            return true;
        }
        let outcome = self.identity.verify(role, address, label, proof);
        self.forward_identity_events();
        if outcome.authorized {
            self.cache.store(role, *address, now);
        }
        outcome.authorized
    }

    fn verify_validator(
        &mut self,
        job: JobId,
        validator: &Address,
        label: &str,
        proof: &[Hash256],
    ) -> Result<VerificationOutcome, ValidationError> {
        let outcome = self.identity.verify(Role::Validator, validator, label, proof);
        self.forward_identity_events();
        if !outcome.authorized {
            tracing::warn!(%job, %validator, label, "validator failed identity check");
            return Err(IdentityError::UnauthorizedValidator(*validator).into());
        }
        Ok(outcome)
    }

    fn push_identity_verified(
        &mut self,
        job: JobId,
        validator: Address,
        label: &str,
        outcome: &VerificationOutcome,
    ) {
        self.pending_events
            .push(ValidationEvent::ValidatorIdentityVerified {
                job,
                validator,
                node: outcome.node,
                label: label.to_string(),
                used_fallback: outcome.used_fallback(),
            });
    }

    fn forward_identity_events(&mut self) {
        self.pending_events.extend(
            self.identity
                .drain_events()
                .into_iter()
                .map(ValidationEvent::Identity),
        );
    }

    /// Apply an identity configuration batch atomically.
    pub fn apply_identity_batch(
        &mut self,
        caller: Address,
        batch: ConfigBatch,
    ) -> Result<ConfigSummary, ValidationError> {
        self.ensure_governance(&caller)?;
        let result = self.identity.apply_batch(batch);
        self.forward_identity_events();
        let summary = result?;
        self.cache.sync_version(self.identity.version());
        Ok(summary)
    }

    /// Invalidate every cached authorization.
    pub fn bump_cache_version(&mut self, caller: Address) -> Result<u64, ValidationError> {
        self.ensure_governance(&caller)?;
        let version = self.identity.bump_version();
        self.forward_identity_events();
        self.cache.sync_version(version);
        Ok(version)
    }

    // ── Policy ───────────────────────────────────────────────────────────

    /// Turn acknowledgement enforcement on or off.
    pub fn set_policy(&mut self, caller: Address, enforced: bool) -> Result<(), ValidationError> {
        self.ensure_governance(&caller)?;
        self.policy_enforced = enforced;
        tracing::info!(enforced, version = self.policy.version(), "policy enforcement updated");
        Ok(())
    }

    pub fn bump_policy_version(&mut self, caller: Address) -> Result<u64, ValidationError> {
        self.ensure_governance(&caller)?;
        let version = self.policy.bump_version();
        tracing::info!(version, "policy version bumped");
        self.pending_events
            .push(ValidationEvent::PolicyVersionBumped { version });
        Ok(version)
    }

    /// Record that the caller accepts the current policy version.
    pub fn acknowledge_policy(&mut self, caller: Address) {
        self.policy.acknowledge(caller);
    }

    // ── Pause ────────────────────────────────────────────────────────────

    /// Block selection, commits, and reveals until [`Self::unpause`].
    pub fn pause(&mut self, caller: Address) -> Result<(), ValidationError> {
        self.set_paused(caller, true)
    }

    pub fn unpause(&mut self, caller: Address) -> Result<(), ValidationError> {
        self.set_paused(caller, false)
    }

    fn set_paused(&mut self, caller: Address, paused: bool) -> Result<(), ValidationError> {
        self.ensure_governance(&caller)?;
        if self.paused != paused {
            self.paused = paused;
            tracing::warn!(paused, "validation pause updated");
            self.pending_events
                .push(ValidationEvent::PauseUpdated { paused });
        }
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn ensure_not_paused(&self) -> Result<(), ValidationError> {
        if self.paused {
            return Err(ValidationError::Paused);
        }
        Ok(())
    }

    fn ensure_policy(&self, caller: &Address) -> Result<(), ValidationError> {
        if self.policy_enforced && !self.policy.has_acknowledged(caller) {
            return Err(ValidationError::PolicyNotAcknowledged(*caller));
        }
        Ok(())
    }

    // ── Governance setters ───────────────────────────────────────────────

    fn ensure_governance(&self, caller: &Address) -> Result<(), ValidationError> {
        if *caller != self.governance {
            return Err(ValidationError::Unauthorized(*caller));
        }
        Ok(())
    }

    /// Apply `change` to a copy of the parameters and install it if valid.
    fn update_params(
        &mut self,
        caller: &Address,
        change: impl FnOnce(&mut ValidationParams),
    ) -> Result<(), ValidationError> {
        self.ensure_governance(caller)?;
        let mut next = self.params.clone();
        change(&mut next);
        next.validate()?;
        if self.pool.len() > next.max_pool_size as usize {
            return Err(ValidationError::PoolTooLarge {
                size: self.pool.len(),
                max: next.max_pool_size,
            });
        }
        self.cache.set_duration(next.auth_cache_duration_secs);
        tracing::info!(?next, "validation parameters updated");
        self.params = next;
        Ok(())
    }

    pub fn set_params(&mut self, caller: Address, params: ValidationParams) -> Result<(), ValidationError> {
        self.update_params(&caller, |current| *current = params)
    }

    /// Set committee bounds. The per-job target and required approvals are
    /// pulled into the new bounds.
    pub fn set_validator_bounds(&mut self, caller: Address, min: u32, max: u32) -> Result<(), ValidationError> {
        self.update_params(&caller, |params| {
            params.min_validators = min;
            params.max_validators = max;
            params.validators_per_job = params.validators_per_job.clamp(min, max.max(min));
            params.required_approvals = params.required_approvals.min(params.validators_per_job);
        })
    }

    pub fn set_validators_per_job(&mut self, caller: Address, count: u32) -> Result<(), ValidationError> {
        self.update_params(&caller, |params| {
            params.validators_per_job = count;
            params.required_approvals = params.required_approvals.min(count).max(1);
        })
    }

    /// Zero or more than `max_validators` is rejected; the stored value is
    /// clamped to `validators_per_job`.
    pub fn set_required_approvals(&mut self, caller: Address, count: u32) -> Result<(), ValidationError> {
        self.ensure_governance(&caller)?;
        if count == 0 || count > self.params.max_validators {
            return Err(ValidationError::InvalidApprovals(count));
        }
        self.update_params(&caller, |params| {
            params.required_approvals = count.min(params.validators_per_job);
        })
    }

    pub fn set_max_pool_size(&mut self, caller: Address, size: u32) -> Result<(), ValidationError> {
        self.update_params(&caller, |params| params.max_pool_size = size)
    }

    pub fn set_validator_pool_sample_size(&mut self, caller: Address, size: u32) -> Result<(), ValidationError> {
        self.update_params(&caller, |params| params.validator_pool_sample_size = size)
    }

    pub fn set_selection_strategy(
        &mut self,
        caller: Address,
        strategy: SelectionStrategy,
    ) -> Result<(), ValidationError> {
        self.update_params(&caller, |params| params.selection_strategy = strategy)
    }

    pub fn set_windows(&mut self, caller: Address, commit_secs: u64, reveal_secs: u64) -> Result<(), ValidationError> {
        self.update_params(&caller, |params| {
            params.commit_window_secs = commit_secs;
            params.reveal_window_secs = reveal_secs;
        })
    }

    pub fn set_selection_delay(&mut self, caller: Address, blocks: u64) -> Result<(), ValidationError> {
        self.update_params(&caller, |params| params.selection_delay_blocks = blocks)
    }

    pub fn set_slash_pct(&mut self, caller: Address, pct: u8) -> Result<(), ValidationError> {
        self.update_params(&caller, |params| params.slash_pct = pct)
    }

    pub fn set_force_finalize_grace(&mut self, caller: Address, secs: u64) -> Result<(), ValidationError> {
        self.update_params(&caller, |params| params.force_finalize_grace_secs = secs)
    }

    pub fn set_auth_cache_duration(&mut self, caller: Address, secs: u64) -> Result<(), ValidationError> {
        self.update_params(&caller, |params| params.auth_cache_duration_secs = secs)
    }

    /// Replace the validator pool.
    pub fn set_validator_pool(&mut self, caller: Address, pool: Vec<Address>) -> Result<(), ValidationError> {
        self.ensure_governance(&caller)?;
        if pool.len() > self.params.max_pool_size as usize {
            return Err(ValidationError::PoolTooLarge {
                size: pool.len(),
                max: self.params.max_pool_size,
            });
        }
        let mut seen = HashSet::with_capacity(pool.len());
        for address in &pool {
            if address.is_zero() {
                return Err(ValidationError::ZeroAddress("validator"));
            }
            if !seen.insert(*address) {
                return Err(ValidationError::DuplicateValidator(*address));
            }
        }
        tracing::info!(size = pool.len(), "validator pool updated");
        self.pool = pool;
        Ok(())
    }

    // ── Accessors ────────────────────────────────────────────────────────

    fn submitted_job(&self, job: JobId) -> Result<Job, ValidationError> {
        let record = self.jobs.job(job).ok_or(ValidationError::JobNotFound(job))?;
        if !record.status.is_submitted() {
            return Err(ValidationError::JobNotSubmitted(job));
        }
        Ok(record)
    }

    pub fn governance(&self) -> Address {
        self.governance
    }

    pub fn params(&self) -> &ValidationParams {
        &self.params
    }

    pub fn pool(&self) -> &[Address] {
        &self.pool
    }

    pub fn identity(&self) -> &IdentityRegistry {
        &self.identity
    }

    pub fn cache(&self) -> &AuthorizationCache {
        &self.cache
    }

    pub fn policy(&self) -> &PolicyAcknowledgements {
        &self.policy
    }

    pub fn policy_enforced(&self) -> bool {
        self.policy_enforced
    }

    pub fn round(&self, job: JobId) -> Option<&JobRound> {
        self.rounds.get(&job)
    }

    /// Current nonce for the job (0 until the first reset).
    pub fn job_nonce(&self, job: JobId) -> u64 {
        self.rounds.get(&job).map_or(0, |round| round.nonce)
    }

    /// Target block of the pending entropy round, if any.
    pub fn selection_block(&self, job: JobId) -> Option<BlockNumber> {
        self.rounds
            .get(&job)
            .and_then(|round| round.entropy.as_ref())
            .map(EntropyRound::target_block)
    }

    /// Contributors to the pending entropy round, or to the seed that chose
    /// the current committee once it is resolved.
    pub fn entropy_contributor_count(&self, job: JobId) -> usize {
        self.rounds.get(&job).map_or(0, |round| match &round.entropy {
            Some(pending) => pending.contributor_count(),
            None => round.entropy_contributors,
        })
    }

    /// Start cursor for the next rotating selection window.
    pub fn pool_rotation(&self) -> u64 {
        self.pool_rotation
    }

    pub fn validators(&self, job: JobId) -> &[Address] {
        self.rounds
            .get(&job)
            .map(|round| round.validators.as_slice())
            .unwrap_or(&[])
    }

    /// Stored commitment, or [`Hash256::ZERO`] if none.
    pub fn commitment(&self, job: JobId, validator: &Address, nonce: u64) -> Hash256 {
        self.commitments
            .get(&(job, *validator, nonce))
            .copied()
            .unwrap_or(Hash256::ZERO)
    }

    pub fn selection_phase(&self, job: JobId) -> SelectionPhase {
        let current = self.chain.block_number();
        self.rounds
            .get(&job)
            .map_or(SelectionPhase::Unselected, |round| round.selection_phase(current))
    }

    pub fn vote_phase(&self, job: JobId) -> VotePhase {
        let now = self.chain.timestamp();
        self.rounds
            .get(&job)
            .map_or(VotePhase::Open, |round| round.vote_phase(now))
    }

    /// Jobs with a committee selected but not yet finalized.
    pub fn open_rounds(&self) -> usize {
        self.rounds
            .values()
            .filter(|round| round.is_selected() && !round.is_finalized())
            .count()
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<ValidationEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
