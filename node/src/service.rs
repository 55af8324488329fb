//! Single-writer service around the [`ValidationModule`].
//!
//! One tokio task owns the module and applies [`Command`]s in arrival order,
//! so every operation sees the state left by the previous one and none
//! observes a partial transition. Callers hold a cloneable
//! [`ValidationHandle`] and await a [`Reply`] carrying the operation result
//! together with the events it emitted.

use agij_identity::{ConfigBatch, ConfigSummary};
use agij_types::{Address, Hash256, JobId};
use agij_validation::{
    JobRound, SelectionPhase, ValidationError, ValidationEvent, ValidationModule, VotePhase,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::event_bus::EventBus;
use crate::metrics::ValidationMetrics;
use crate::tracing_spans::{command_span, job_span, participant_span};
use crate::NodeError;

/// Result of one command plus every event it emitted.
#[derive(Debug)]
pub struct Reply<T> {
    pub result: Result<T, ValidationError>,
    pub events: Vec<ValidationEvent>,
}

impl<T> Reply<T> {
    pub fn into_result(self) -> Result<T, ValidationError> {
        self.result
    }
}

type ReplyTx<T> = oneshot::Sender<Reply<T>>;

/// Arguments of a reveal.
#[derive(Clone, Debug)]
pub struct RevealRequest {
    pub approve: bool,
    pub burn_hash: Hash256,
    pub salt: Hash256,
    pub label: String,
    pub proof: Vec<Hash256>,
}

/// Read-only view of one job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobView {
    pub round: Option<JobRound>,
    pub selection: SelectionPhase,
    pub vote: VotePhase,
}

pub enum Command {
    Start {
        caller: Address,
        job: JobId,
        entropy: u128,
        reply: ReplyTx<Option<Vec<Address>>>,
    },
    SelectValidators {
        caller: Address,
        job: JobId,
        entropy: u128,
        reply: ReplyTx<Option<Vec<Address>>>,
    },
    Commit {
        caller: Address,
        job: JobId,
        commitment: Hash256,
        label: String,
        proof: Vec<Hash256>,
        reply: ReplyTx<()>,
    },
    Reveal {
        caller: Address,
        job: JobId,
        request: RevealRequest,
        reply: ReplyTx<()>,
    },
    Finalize {
        job: JobId,
        reply: ReplyTx<bool>,
    },
    ForceFinalize {
        job: JobId,
        reply: ReplyTx<()>,
    },
    ResetNonce {
        caller: Address,
        job: JobId,
        reply: ReplyTx<u64>,
    },
    AuthorizeAgent {
        agent: Address,
        label: String,
        proof: Vec<Hash256>,
        reply: ReplyTx<()>,
    },
    ApplyIdentityBatch {
        caller: Address,
        batch: ConfigBatch,
        reply: ReplyTx<ConfigSummary>,
    },
    BumpCacheVersion {
        caller: Address,
        reply: ReplyTx<u64>,
    },
    AcknowledgePolicy {
        caller: Address,
        reply: ReplyTx<()>,
    },
    SetPaused {
        caller: Address,
        paused: bool,
        reply: ReplyTx<()>,
    },
    Job {
        job: JobId,
        reply: oneshot::Sender<JobView>,
    },
    Snapshot {
        reply: oneshot::Sender<Result<Vec<u8>, ValidationError>>,
    },
    Shutdown,
}

/// The task that owns the module.
pub struct ValidationService {
    module: ValidationModule,
    commands: mpsc::Receiver<Command>,
    metrics: Arc<ValidationMetrics>,
    bus: EventBus,
}

impl ValidationService {
    /// Spawn the service on the current runtime. The join handle yields the
    /// module back after [`ValidationHandle::shutdown`] so it can be persisted.
    pub fn spawn(
        module: ValidationModule,
        metrics: Arc<ValidationMetrics>,
        bus: EventBus,
        buffer: usize,
    ) -> (ValidationHandle, JoinHandle<ValidationModule>) {
        let (tx, commands) = mpsc::channel(buffer.max(1));
        metrics.set_open_rounds(module.open_rounds());
        let service = Self {
            module,
            commands,
            metrics,
            bus,
        };
        let task = tokio::spawn(service.run());
        (ValidationHandle { tx }, task)
    }

    async fn run(mut self) -> ValidationModule {
        tracing::info!(listeners = self.bus.listener_count(), "validation service started");
        while let Some(command) = self.commands.recv().await {
            if !self.handle(command) {
                break;
            }
        }
        tracing::info!(open_rounds = self.module.open_rounds(), "validation service stopped");
        self.module
    }

    /// Apply one command. Returns `false` on shutdown.
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Start {
                caller,
                job,
                entropy,
                reply,
            } => {
                let _span = participant_span("start", job, &caller).entered();
                let result = self.module.start(caller, job, entropy);
                self.respond(reply, result);
            }
            Command::SelectValidators {
                caller,
                job,
                entropy,
                reply,
            } => {
                let _span = participant_span("select_validators", job, &caller).entered();
                let result = self.module.select_validators(caller, job, entropy);
                self.respond(reply, result);
            }
            Command::Commit {
                caller,
                job,
                commitment,
                label,
                proof,
                reply,
            } => {
                let _span = participant_span("commit", job, &caller).entered();
                let result = self.module.commit(caller, job, commitment, &label, &proof);
                self.respond(reply, result);
            }
            Command::Reveal {
                caller,
                job,
                request,
                reply,
            } => {
                let _span = participant_span("reveal", job, &caller).entered();
                let result = self.module.reveal(
                    caller,
                    job,
                    request.approve,
                    request.burn_hash,
                    request.salt,
                    &request.label,
                    &request.proof,
                );
                self.respond(reply, result);
            }
            Command::Finalize { job, reply } => {
                let _span = job_span("finalize", job).entered();
                let result = self.module.finalize(job);
                self.respond(reply, result);
            }
            Command::ForceFinalize { job, reply } => {
                let _span = job_span("force_finalize", job).entered();
                let result = self.module.force_finalize(job);
                self.respond(reply, result);
            }
            Command::ResetNonce { caller, job, reply } => {
                let _span = participant_span("reset_job_nonce", job, &caller).entered();
                let result = self.module.reset_job_nonce(caller, job);
                self.respond(reply, result);
            }
            Command::AuthorizeAgent {
                agent,
                label,
                proof,
                reply,
            } => {
                let _span = command_span("authorize_agent").entered();
                let result = self
                    .module
                    .is_authorized_agent_cached(agent, &label, &proof)
                    .map_err(ValidationError::from);
                self.respond(reply, result);
            }
            Command::ApplyIdentityBatch {
                caller,
                batch,
                reply,
            } => {
                let _span = command_span("apply_identity_batch").entered();
                let result = self.module.apply_identity_batch(caller, batch);
                self.respond(reply, result);
            }
            Command::BumpCacheVersion { caller, reply } => {
                let _span = command_span("bump_cache_version").entered();
                let result = self.module.bump_cache_version(caller);
                self.respond(reply, result);
            }
            Command::AcknowledgePolicy { caller, reply } => {
                self.module.acknowledge_policy(caller);
                self.respond(reply, Ok(()));
            }
            Command::SetPaused {
                caller,
                paused,
                reply,
            } => {
                let _span = command_span(if paused { "pause" } else { "unpause" }).entered();
                let result = if paused {
                    self.module.pause(caller)
                } else {
                    self.module.unpause(caller)
                };
                self.respond(reply, result);
            }
            Command::Job { job, reply } => {
                let view = JobView {
                    round: self.module.round(job).cloned(),
                    selection: self.module.selection_phase(job),
                    vote: self.module.vote_phase(job),
                };
                let _ = reply.send(view);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.module.snapshot().to_bytes());
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn respond<T>(&mut self, reply: ReplyTx<T>, result: Result<T, ValidationError>) {
        if let Err(err) = &result {
            tracing::debug!(%err, "command rejected");
        }
        let events = self.module.drain_events();
        self.metrics.observe(&events);
        self.metrics.set_open_rounds(self.module.open_rounds());
        for event in &events {
            self.bus.emit(event);
        }
        if reply.send(Reply { result, events }).is_err() {
            tracing::debug!("caller dropped before the reply was sent");
        }
    }
}

/// Cloneable client of the [`ValidationService`].
#[derive(Clone)]
pub struct ValidationHandle {
    tx: mpsc::Sender<Command>,
}

impl ValidationHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, NodeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| NodeError::ServiceClosed)?;
        rx.await.map_err(|_| NodeError::ServiceClosed)
    }

    pub async fn start(
        &self,
        caller: Address,
        job: JobId,
        entropy: u128,
    ) -> Result<Reply<Option<Vec<Address>>>, NodeError> {
        self.request(|reply| Command::Start {
            caller,
            job,
            entropy,
            reply,
        })
        .await
    }

    pub async fn select_validators(
        &self,
        caller: Address,
        job: JobId,
        entropy: u128,
    ) -> Result<Reply<Option<Vec<Address>>>, NodeError> {
        self.request(|reply| Command::SelectValidators {
            caller,
            job,
            entropy,
            reply,
        })
        .await
    }

    pub async fn commit(
        &self,
        caller: Address,
        job: JobId,
        commitment: Hash256,
        label: impl Into<String>,
        proof: Vec<Hash256>,
    ) -> Result<Reply<()>, NodeError> {
        let label = label.into();
        self.request(|reply| Command::Commit {
            caller,
            job,
            commitment,
            label,
            proof,
            reply,
        })
        .await
    }

    pub async fn reveal(
        &self,
        caller: Address,
        job: JobId,
        request: RevealRequest,
    ) -> Result<Reply<()>, NodeError> {
        self.request(|reply| Command::Reveal {
            caller,
            job,
            request,
            reply,
        })
        .await
    }

    pub async fn finalize(&self, job: JobId) -> Result<Reply<bool>, NodeError> {
        self.request(|reply| Command::Finalize { job, reply }).await
    }

    pub async fn force_finalize(&self, job: JobId) -> Result<Reply<()>, NodeError> {
        self.request(|reply| Command::ForceFinalize { job, reply }).await
    }

    pub async fn reset_job_nonce(&self, caller: Address, job: JobId) -> Result<Reply<u64>, NodeError> {
        self.request(|reply| Command::ResetNonce { caller, job, reply })
            .await
    }

    pub async fn authorize_agent(
        &self,
        agent: Address,
        label: impl Into<String>,
        proof: Vec<Hash256>,
    ) -> Result<Reply<()>, NodeError> {
        let label = label.into();
        self.request(|reply| Command::AuthorizeAgent {
            agent,
            label,
            proof,
            reply,
        })
        .await
    }

    pub async fn apply_identity_batch(
        &self,
        caller: Address,
        batch: ConfigBatch,
    ) -> Result<Reply<ConfigSummary>, NodeError> {
        self.request(|reply| Command::ApplyIdentityBatch {
            caller,
            batch,
            reply,
        })
        .await
    }

    pub async fn bump_cache_version(&self, caller: Address) -> Result<Reply<u64>, NodeError> {
        self.request(|reply| Command::BumpCacheVersion { caller, reply })
            .await
    }

    pub async fn acknowledge_policy(&self, caller: Address) -> Result<Reply<()>, NodeError> {
        self.request(|reply| Command::AcknowledgePolicy { caller, reply })
            .await
    }

    /// Block selection, commits, and reveals. Governance only.
    pub async fn pause(&self, caller: Address) -> Result<Reply<()>, NodeError> {
        self.request(|reply| Command::SetPaused {
            caller,
            paused: true,
            reply,
        })
        .await
    }

    pub async fn unpause(&self, caller: Address) -> Result<Reply<()>, NodeError> {
        self.request(|reply| Command::SetPaused {
            caller,
            paused: false,
            reply,
        })
        .await
    }

    pub async fn job(&self, job: JobId) -> Result<JobView, NodeError> {
        self.request(|reply| Command::Job { job, reply }).await
    }

    /// Encoded [`agij_validation::ModuleSnapshot`] of the current state.
    pub async fn snapshot(&self) -> Result<Vec<u8>, NodeError> {
        Ok(self.request(|reply| Command::Snapshot { reply }).await??)
    }

    /// Stop the service after the commands already queued.
    pub async fn shutdown(&self) -> Result<(), NodeError> {
        self.tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| NodeError::ServiceClosed)
    }
}
