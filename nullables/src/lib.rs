//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the validation engine (the ordering
//! ledger, the name service, the attestation registry, the job registry) is
//! reached through a trait. This crate provides implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod chain;
pub mod jobs;
pub mod names;

pub use chain::NullChain;
pub use jobs::NullJobRegistry;
pub use names::{NullAttestations, NullNameService};
