//! External name-ownership and attestation lookups.

use agij_types::{Address, Hash256, Role};
use thiserror::Error;

/// A lookup against the external name service failed outright.
///
/// Distinct from "not the owner": verification treats it as a recoverable
/// fault and moves on to the next fallback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("name service fault: {0}")]
pub struct NameServiceError(pub String);

/// Hierarchical name registry (ownership records plus resolver records).
pub trait NameService: Send + Sync {
    /// Registered owner of `node`, if any.
    fn owner_of(&self, node: &Hash256) -> Result<Option<Address>, NameServiceError>;

    /// Address the node's resolver points at, if a resolver is set.
    fn resolve_addr(&self, node: &Hash256) -> Result<Option<Address>, NameServiceError>;
}

/// Registry of explicit attestations made by name owners.
pub trait AttestationService: Send + Sync {
    /// Whether `address` is attested for `role` under `node`.
    fn is_attested(&self, node: &Hash256, role: Role, address: &Address) -> bool;
}
