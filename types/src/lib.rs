//! Fundamental types for the validator consensus engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses, hashes, job records, roles, timestamps, and validation parameters.

pub mod address;
pub mod error;
pub mod hash;
pub mod job;
pub mod params;
pub mod role;
pub mod time;

pub use address::Address;
pub use error::TypesError;
pub use hash::Hash256;
pub use job::{Job, JobId, JobStatus};
pub use params::{SelectionStrategy, ValidationParams};
pub use role::Role;
pub use time::{BlockNumber, Timestamp};
