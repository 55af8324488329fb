//! Validator consensus for submitted jobs.
//!
//! A job's validation runs in three stages, each a set of guarded
//! transitions on the job's current round:
//!
//! - **Selection**: entropy from at least two parties is anchored to a future
//!   block hash, then a committee is drawn from the eligible pool weighted by
//!   validator stake.
//! - **Commit-reveal**: committee members commit `H(job, nonce, vote, burn,
//!   salt, spec)`, then reveal after the commit window closes.
//! - **Finalization**: revealed votes are tallied by strict majority; the
//!   minority is slashed and the majority gains reputation.
//!
//! Every vote is gated by the identity verifier in `agij-identity`.

pub mod commit_reveal;
pub mod error;
pub mod events;
pub mod finalize;
pub mod jobs;
pub mod module;
pub mod policy;
pub mod selection;
pub mod snapshot;
pub mod state;

pub use commit_reveal::{commitment_hash, CommitRevealCoordinator};
pub use error::ValidationError;
pub use events::{SelectionResetReason, ValidationEvent};
pub use finalize::{slash_amount, FinalizationEngine, Settlement, Tally};
pub use jobs::JobRegistry;
pub use module::{Collaborators, ValidationModule};
pub use policy::PolicyAcknowledgements;
pub use selection::{PoolWindow, ValidatorSelector};
pub use snapshot::ModuleSnapshot;
pub use state::{JobRound, RevealedVote, SelectionPhase, VotePhase};
