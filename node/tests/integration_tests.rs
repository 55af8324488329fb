//! Integration tests for the node: config → module → service → snapshot.
//!
//! These wire the nullable collaborators to a running [`ValidationService`]
//! and drive full rounds through the handle.

use agij_crypto::hash256;
use agij_identity::ConfigBatch;
use agij_node::{
    build_module, load_or_build, save_snapshot, EventBus, IdentityServices, NodeConfig, NodeError,
    RevealRequest, ValidationMetrics, ValidationService, ValidatorEntry,
};
use agij_nullables::{NullAttestations, NullChain, NullJobRegistry, NullNameService};
use agij_stake::{MemoryReputationLedger, MemoryStakeLedger, StakeLedger};
use agij_types::{Address, Hash256, JobId, Role};
use agij_validation::{
    commitment_hash, Collaborators, SelectionPhase, ValidationError, ValidationEvent, VotePhase,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const JOB: JobId = JobId::new(7);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

fn governance() -> Address {
    addr(1)
}

fn registry_address() -> Address {
    addr(2)
}

fn config() -> NodeConfig {
    NodeConfig {
        governance: governance().to_string(),
        job_registry: registry_address().to_string(),
        validators: (10..13)
            .map(|n| ValidatorEntry {
                address: addr(n).to_string(),
                stake: 100,
            })
            .collect(),
        identity: agij_node::IdentitySettings {
            name_service: Some(addr(3).to_string()),
            additional_validators: (10..13).map(|n| addr(n).to_string()).collect(),
            ..Default::default()
        },
        ..NodeConfig::default()
    }
}

struct Env {
    chain: Arc<NullChain>,
    jobs: Arc<NullJobRegistry>,
    stake: Arc<MemoryStakeLedger>,
    collaborators: Collaborators,
    services: IdentityServices,
}

fn env(config: &NodeConfig) -> Env {
    let chain = Arc::new(NullChain::new(50, 10_000));
    let jobs = Arc::new(NullJobRegistry::new(registry_address()));
    jobs.submit(JOB, addr(99));
    let stake = Arc::new(MemoryStakeLedger::new());
    for (address, amount) in config.validator_pool().unwrap() {
        stake.set_stake(address, Role::Validator, amount);
    }
    let collaborators = Collaborators {
        jobs: jobs.clone(),
        stake: stake.clone(),
        reputation: Arc::new(MemoryReputationLedger::new()),
        chain: chain.clone(),
    };
    let services = IdentityServices {
        name_service: Some(Arc::new(NullNameService::new())),
        attestations: Some(Arc::new(NullAttestations::new())),
    };
    Env {
        chain,
        jobs,
        stake,
        collaborators,
        services,
    }
}

fn salt(validator: &Address) -> Hash256 {
    hash256(&[validator.as_bytes(), b"node-salt"])
}

fn reveal_request(validator: &Address, approve: bool) -> RevealRequest {
    RevealRequest {
        approve,
        burn_hash: Hash256::ZERO,
        salt: salt(validator),
        label: String::new(),
        proof: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[test]
fn config_builds_module_with_pool_and_identity() {
    let config = config();
    let env = env(&config);
    let module = build_module(&config, env.collaborators, &env.services).unwrap();
    assert_eq!(module.pool().len(), 3);
    assert_eq!(module.governance(), governance());
    assert_eq!(module.identity().config().name_service, addr(3));
    assert!(module
        .identity()
        .config()
        .is_additional(Role::Validator, &addr(11)));
}

#[test]
fn invalid_config_is_rejected_before_building() {
    let mut config = config();
    config.job_registry = Address::ZERO.to_string();
    let env = env(&config);
    assert!(matches!(
        build_module(&config, env.collaborators, &env.services),
        Err(NodeError::InvalidField { .. })
    ));
}

#[test]
fn oversized_pool_surfaces_validation_error() {
    let mut config = config();
    config.params.max_pool_size = 3;
    config.params.validator_pool_sample_size = 3;
    config.validators.push(ValidatorEntry {
        address: addr(13).to_string(),
        stake: 1,
    });
    let env = env(&config);
    assert!(matches!(
        build_module(&config, env.collaborators, &env.services),
        Err(NodeError::Validation(ValidationError::PoolTooLarge { .. }))
    ));
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_round_through_the_service() {
    let config = config();
    let env = env(&config);
    let module = build_module(&config, env.collaborators.clone(), &env.services).unwrap();
    let metrics = Arc::new(ValidationMetrics::new());

    let finalized = Arc::new(AtomicUsize::new(0));
    let mut bus = EventBus::new();
    let seen = Arc::clone(&finalized);
    bus.subscribe(Box::new(move |event| {
        if matches!(event, ValidationEvent::ValidationFinalized { .. }) {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    }));

    let (handle, task) = ValidationService::spawn(module, Arc::clone(&metrics), bus, 16);

    let started = handle.start(registry_address(), JOB, 1).await.unwrap();
    assert_eq!(started.result.unwrap(), None);
    handle
        .select_validators(addr(500), JOB, 2)
        .await
        .unwrap()
        .into_result()
        .unwrap();
    env.chain.mine(2);
    let committee = handle
        .select_validators(addr(501), JOB, 3)
        .await
        .unwrap()
        .into_result()
        .unwrap()
        .expect("committee resolved");
    assert_eq!(committee.len(), 3);
    assert_eq!(metrics.selections.get(), 1);

    let votes = [(committee[0], true), (committee[1], true), (committee[2], false)];
    for (validator, approve) in votes {
        let hash = commitment_hash(JOB, 0, approve, &Hash256::ZERO, &salt(&validator), &Hash256::ZERO);
        let reply = handle.commit(validator, JOB, hash, "", Vec::new()).await.unwrap();
        reply.result.unwrap();
        assert!(reply
            .events
            .iter()
            .any(|e| matches!(e, ValidationEvent::ValidationCommitted { .. })));
    }
    assert_eq!(handle.job(JOB).await.unwrap().vote, VotePhase::Committing);

    env.chain.advance_time(60);
    for (validator, approve) in votes {
        handle
            .reveal(validator, JOB, reveal_request(&validator, approve))
            .await
            .unwrap()
            .into_result()
            .unwrap();
    }
    env.chain.advance_time(60);

    let outcome = handle.finalize(JOB).await.unwrap();
    assert!(outcome.result.unwrap());
    assert_eq!(env.jobs.outcomes(), vec![(JOB, true)]);
    assert_eq!(env.stake.stake_of(&committee[2], Role::Validator), 50);
    assert_eq!(metrics.commits.get(), 3);
    assert_eq!(metrics.reveals.get(), 3);
    assert_eq!(metrics.slashes.get(), 1);
    assert_eq!(metrics.open_rounds.get(), 0);
    assert_eq!(finalized.load(Ordering::SeqCst), 1);

    let view = handle.job(JOB).await.unwrap();
    assert_eq!(view.selection, SelectionPhase::Resolved);
    assert_eq!(view.vote, VotePhase::Closed);

    handle.shutdown().await.unwrap();
    let module = task.await.unwrap();
    assert_eq!(module.round(JOB).and_then(|r| r.outcome), Some(true));
}

#[tokio::test]
async fn rejected_command_leaves_service_running() {
    let config = config();
    let env = env(&config);
    let module = build_module(&config, env.collaborators, &env.services).unwrap();
    let (handle, _task) =
        ValidationService::spawn(module, Arc::new(ValidationMetrics::new()), EventBus::new(), 4);

    let reply = handle.start(addr(404), JOB, 1).await.unwrap();
    assert!(matches!(reply.result, Err(ValidationError::Unauthorized(a)) if a == addr(404)));

    let reply = handle.reset_job_nonce(governance(), JOB).await.unwrap();
    assert_eq!(reply.result.unwrap(), 1);
    assert!(reply
        .events
        .iter()
        .any(|e| matches!(e, ValidationEvent::NonceReset { nonce: 1, .. })));
}

#[tokio::test]
async fn governance_batch_invalidates_cached_agent() {
    let config = config();
    let env = env(&config);
    let module = build_module(&config, env.collaborators, &env.services).unwrap();
    let metrics = Arc::new(ValidationMetrics::new());
    let (handle, _task) = ValidationService::spawn(module, Arc::clone(&metrics), EventBus::new(), 4);

    let agent = addr(77);
    handle
        .apply_identity_batch(governance(), ConfigBatch::new().allow(Role::Agent, agent, true))
        .await
        .unwrap()
        .into_result()
        .unwrap();
    handle.authorize_agent(agent, "", Vec::new()).await.unwrap().into_result().unwrap();
    handle.authorize_agent(agent, "", Vec::new()).await.unwrap().into_result().unwrap();
    assert_eq!(metrics.cache_hits.get(), 1);

    handle
        .apply_identity_batch(governance(), ConfigBatch::new().allow(Role::Agent, agent, false))
        .await
        .unwrap()
        .into_result()
        .unwrap();
    let reply = handle.authorize_agent(agent, "", Vec::new()).await.unwrap();
    assert!(reply.result.is_err());
    assert_eq!(metrics.identity_failures.get(), 1);
}

#[tokio::test]
async fn paused_service_rejects_selection_until_unpaused() {
    let config = config();
    let env = env(&config);
    let module = build_module(&config, env.collaborators, &env.services).unwrap();
    let (handle, _task) =
        ValidationService::spawn(module, Arc::new(ValidationMetrics::new()), EventBus::new(), 4);

    let reply = handle.pause(addr(404)).await.unwrap();
    assert!(matches!(reply.result, Err(ValidationError::Unauthorized(_))));

    let reply = handle.pause(governance()).await.unwrap();
    reply.result.unwrap();
    assert!(reply
        .events
        .iter()
        .any(|e| matches!(e, ValidationEvent::PauseUpdated { paused: true })));
    let reply = handle.start(registry_address(), JOB, 1).await.unwrap();
    assert!(matches!(reply.result, Err(ValidationError::Paused)));
    assert_eq!(handle.job(JOB).await.unwrap().selection, SelectionPhase::Unselected);

    handle.unpause(governance()).await.unwrap().into_result().unwrap();
    assert_eq!(handle.start(registry_address(), JOB, 1).await.unwrap().result.unwrap(), None);
    assert_eq!(
        handle.job(JOB).await.unwrap().selection,
        SelectionPhase::AccumulatingEntropy
    );
}

#[tokio::test]
async fn handle_reports_closed_service() {
    let config = config();
    let env = env(&config);
    let module = build_module(&config, env.collaborators, &env.services).unwrap();
    let (handle, task) =
        ValidationService::spawn(module, Arc::new(ValidationMetrics::new()), EventBus::new(), 4);
    handle.shutdown().await.unwrap();
    task.await.unwrap();
    assert!(matches!(handle.finalize(JOB).await, Err(NodeError::ServiceClosed)));
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[tokio::test]
async fn snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.snapshot_path = Some(dir.path().join("validation.snapshot"));
    let env = env(&config);

    let module = load_or_build(&config, env.collaborators.clone(), &env.services).unwrap();
    let (handle, task) =
        ValidationService::spawn(module, Arc::new(ValidationMetrics::new()), EventBus::new(), 4);
    handle.start(registry_address(), JOB, 1).await.unwrap().into_result().unwrap();
    handle.reset_job_nonce(governance(), JOB).await.unwrap().into_result().unwrap();
    let live_bytes = handle.snapshot().await.unwrap();
    handle.shutdown().await.unwrap();
    let module = task.await.unwrap();

    let path = config.snapshot_path.clone().unwrap();
    save_snapshot(&module, &path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), live_bytes);

    let restored = load_or_build(&config, env.collaborators, &env.services).unwrap();
    assert_eq!(restored.job_nonce(JOB), 1);
    assert_eq!(restored.snapshot(), module.snapshot());
}

#[test]
fn corrupt_snapshot_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    let path = dir.path().join("bad.snapshot");
    std::fs::write(&path, b"not a snapshot").unwrap();
    config.snapshot_path = Some(path);
    let env = env(&config);
    assert!(matches!(
        load_or_build(&config, env.collaborators, &env.services),
        Err(NodeError::Validation(ValidationError::Codec(_)))
    ));
}
