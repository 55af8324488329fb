//! Identity verification for agents and validators.
//!
//! An address may act in a role under a claimed label if, in strict order:
//!
//! 1. it is **not blacklisted** by the reputation ledger (blacklisting wins
//!    over everything else),
//! 2. it is on the role's **allow-list**,
//! 3. it proves **merkle membership** of `H(address || H(label))` under the
//!    role's merkle root, or
//! 4. it **owns the label** under the role's primary root or an enabled alias
//!    root: directly, through the resolver record, or through an attestation.
//!
//! Configuration is a single versioned record updated only through atomic
//! batches. The version feeds the [`AuthorizationCache`], which compares
//! entries against it on read instead of sweeping on write.

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod registry;
pub mod service;

pub use cache::{AuthCacheEntry, AuthorizationCache};
pub use config::{ConfigBatch, ConfigSummary, IdentityConfig};
pub use error::IdentityError;
pub use events::{FailureReason, IdentityEvent};
pub use registry::{IdentityRegistry, VerificationOutcome, VerificationPath};
pub use service::{AttestationService, NameService, NameServiceError};
