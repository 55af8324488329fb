//! Nullable name service and attestation registry.

use agij_crypto::sub_node;
use agij_identity::{AttestationService, NameService, NameServiceError};
use agij_types::{Address, Hash256, Role};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

/// An in-memory name registry.
///
/// Ownership and resolver records are set directly; `set_faulty` makes every
/// ownership lookup fail so recovery paths can be exercised.
#[derive(Default)]
pub struct NullNameService {
    owners: Mutex<HashMap<Hash256, Address>>,
    resolved: Mutex<HashMap<Hash256, Address>>,
    faulty: Mutex<bool>,
}

impl NullNameService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_owner(&self, node: Hash256, owner: Address) {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node, owner);
    }

    /// Register `owner` for `label` under `root`.
    pub fn register(&self, root: &Hash256, label: &str, owner: Address) {
        self.set_owner(sub_node(root, label), owner);
    }

    pub fn set_resolved(&self, node: Hash256, address: Address) {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node, address);
    }

    pub fn set_faulty(&self, faulty: bool) {
        *self.faulty.lock().unwrap_or_else(PoisonError::into_inner) = faulty;
    }
}

impl NameService for NullNameService {
    fn owner_of(&self, node: &Hash256) -> Result<Option<Address>, NameServiceError> {
        if *self.faulty.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(NameServiceError("ownership lookup reverted".into()));
        }
        Ok(self
            .owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(node)
            .copied())
    }

    fn resolve_addr(&self, node: &Hash256) -> Result<Option<Address>, NameServiceError> {
        Ok(self
            .resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(node)
            .copied())
    }
}

/// An in-memory attestation registry.
#[derive(Default)]
pub struct NullAttestations {
    attested: Mutex<HashSet<(Hash256, Role, Address)>>,
}

impl NullAttestations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attest(&self, node: Hash256, role: Role, address: Address) {
        self.attested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((node, role, address));
    }

    pub fn revoke(&self, node: Hash256, role: Role, address: Address) {
        self.attested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(node, role, address));
    }
}

impl AttestationService for NullAttestations {
    fn is_attested(&self, node: &Hash256, role: Role, address: &Address) -> bool {
        self.attested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(*node, role, *address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faulty_service_errors_on_ownership_only() {
        let names = NullNameService::new();
        let node = Hash256::new([1; 32]);
        names.set_resolved(node, Address::from_low_u64(1));
        names.set_faulty(true);
        assert!(names.owner_of(&node).is_err());
        assert_eq!(names.resolve_addr(&node), Ok(Some(Address::from_low_u64(1))));
    }

    #[test]
    fn attestations_are_role_scoped() {
        let attestations = NullAttestations::new();
        let node = Hash256::new([2; 32]);
        let who = Address::from_low_u64(3);
        attestations.attest(node, Role::Validator, who);
        assert!(attestations.is_attested(&node, Role::Validator, &who));
        assert!(!attestations.is_attested(&node, Role::Agent, &who));
        attestations.revoke(node, Role::Validator, who);
        assert!(!attestations.is_attested(&node, Role::Validator, &who));
    }
}
