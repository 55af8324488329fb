//! Versioned identity configuration and atomic update batches.

use crate::error::IdentityError;
use crate::service::{AttestationService, NameService};
use agij_types::{Address, Hash256, Role};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// The single configuration record consulted by every verification.
///
/// `version` increases on every applied batch and on explicit bumps; caches
/// compare against it rather than against field values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub name_service: Address,
    pub attestation_registry: Option<Address>,
    pub agent_root_node: Hash256,
    pub club_root_node: Hash256,
    pub agent_merkle_root: Hash256,
    pub validator_merkle_root: Hash256,
    /// Alias roots with their enabled flag. Disabled aliases stay listed.
    pub agent_aliases: BTreeMap<Hash256, bool>,
    pub validator_aliases: BTreeMap<Hash256, bool>,
    pub additional_agents: BTreeSet<Address>,
    pub additional_validators: BTreeSet<Address>,
    pub version: u64,
}

impl IdentityConfig {
    /// Primary root node for `role` (`club_root_node` for validators).
    pub fn root_node(&self, role: Role) -> Hash256 {
        match role {
            Role::Agent => self.agent_root_node,
            Role::Validator => self.club_root_node,
        }
    }

    pub fn merkle_root(&self, role: Role) -> Hash256 {
        match role {
            Role::Agent => self.agent_merkle_root,
            Role::Validator => self.validator_merkle_root,
        }
    }

    pub fn aliases(&self, role: Role) -> &BTreeMap<Hash256, bool> {
        match role {
            Role::Agent => &self.agent_aliases,
            Role::Validator => &self.validator_aliases,
        }
    }

    pub fn is_alias_enabled(&self, role: Role, root: &Hash256) -> bool {
        self.aliases(role).get(root).copied().unwrap_or(false)
    }

    pub fn is_additional(&self, role: Role, address: &Address) -> bool {
        match role {
            Role::Agent => self.additional_agents.contains(address),
            Role::Validator => self.additional_validators.contains(address),
        }
    }

    /// Roots to check ownership under: the primary (if set) then every
    /// enabled alias. The flag marks alias roots.
    pub fn ownership_roots(&self, role: Role) -> Vec<(Hash256, bool)> {
        let primary = self.root_node(role);
        let mut roots = Vec::new();
        if !primary.is_zero() {
            roots.push((primary, false));
        }
        roots.extend(
            self.aliases(role)
                .iter()
                .filter(|(root, enabled)| **enabled && **root != primary)
                .map(|(root, _)| (*root, true)),
        );
        roots
    }
}

/// A set of configuration changes applied all-or-nothing.
///
/// Built with the chained setters; validated in full before any field of the
/// live configuration is touched.
#[derive(Clone, Default)]
pub struct ConfigBatch {
    pub(crate) name_service: Option<(Address, Arc<dyn NameService>)>,
    pub(crate) attestation_registry: Option<(Address, Arc<dyn AttestationService>)>,
    pub(crate) agent_root_node: Option<Hash256>,
    pub(crate) club_root_node: Option<Hash256>,
    pub(crate) agent_merkle_root: Option<Hash256>,
    pub(crate) validator_merkle_root: Option<Hash256>,
    pub(crate) alias_updates: Vec<(Role, Hash256, bool)>,
    pub(crate) allow_list_updates: Vec<(Role, Address, bool)>,
}

impl ConfigBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_service(mut self, address: Address, service: Arc<dyn NameService>) -> Self {
        self.name_service = Some((address, service));
        self
    }

    pub fn attestation_registry(
        mut self,
        address: Address,
        service: Arc<dyn AttestationService>,
    ) -> Self {
        self.attestation_registry = Some((address, service));
        self
    }

    pub fn root_node(mut self, role: Role, node: Hash256) -> Self {
        match role {
            Role::Agent => self.agent_root_node = Some(node),
            Role::Validator => self.club_root_node = Some(node),
        }
        self
    }

    pub fn merkle_root(mut self, role: Role, root: Hash256) -> Self {
        match role {
            Role::Agent => self.agent_merkle_root = Some(root),
            Role::Validator => self.validator_merkle_root = Some(root),
        }
        self
    }

    pub fn alias_root(mut self, role: Role, root: Hash256, enabled: bool) -> Self {
        self.alias_updates.push((role, root, enabled));
        self
    }

    pub fn allow(mut self, role: Role, address: Address, allowed: bool) -> Self {
        self.allow_list_updates.push((role, address, allowed));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name_service.is_none()
            && self.attestation_registry.is_none()
            && self.agent_root_node.is_none()
            && self.club_root_node.is_none()
            && self.agent_merkle_root.is_none()
            && self.validator_merkle_root.is_none()
            && self.alias_updates.is_empty()
            && self.allow_list_updates.is_empty()
    }

    /// Reject the whole batch on the first invalid value.
    pub fn validate(&self) -> Result<(), IdentityError> {
        if let Some((address, _)) = &self.name_service {
            if address.is_zero() {
                return Err(IdentityError::ZeroAddress("name service"));
            }
        }
        if let Some((address, _)) = &self.attestation_registry {
            if address.is_zero() {
                return Err(IdentityError::ZeroAddress("attestation registry"));
            }
        }
        if self.alias_updates.iter().any(|(_, root, _)| root.is_zero()) {
            return Err(IdentityError::ZeroRoot("alias root"));
        }
        if self.allow_list_updates.iter().any(|(_, addr, _)| addr.is_zero()) {
            return Err(IdentityError::ZeroAddress("allow-list entry"));
        }
        Ok(())
    }

    /// Apply to `config`. Caller must have validated first.
    pub(crate) fn apply_to(&self, config: &mut IdentityConfig) {
        if let Some((address, _)) = &self.name_service {
            config.name_service = *address;
        }
        if let Some((address, _)) = &self.attestation_registry {
            config.attestation_registry = Some(*address);
        }
        if let Some(node) = self.agent_root_node {
            config.agent_root_node = node;
        }
        if let Some(node) = self.club_root_node {
            config.club_root_node = node;
        }
        if let Some(root) = self.agent_merkle_root {
            config.agent_merkle_root = root;
        }
        if let Some(root) = self.validator_merkle_root {
            config.validator_merkle_root = root;
        }
        for (role, root, enabled) in &self.alias_updates {
            let aliases = match role {
                Role::Agent => &mut config.agent_aliases,
                Role::Validator => &mut config.validator_aliases,
            };
            aliases.insert(*root, *enabled);
        }
        for (role, address, allowed) in &self.allow_list_updates {
            let list = match role {
                Role::Agent => &mut config.additional_agents,
                Role::Validator => &mut config.additional_validators,
            };
            if *allowed {
                list.insert(*address);
            } else {
                list.remove(address);
            }
        }
    }

    pub(crate) fn summary(&self, version: u64) -> ConfigSummary {
        ConfigSummary {
            name_service: self.name_service.is_some(),
            attestation_registry: self.attestation_registry.is_some(),
            agent_root_node: self.agent_root_node.is_some(),
            club_root_node: self.club_root_node.is_some(),
            agent_merkle_root: self.agent_merkle_root.is_some(),
            validator_merkle_root: self.validator_merkle_root.is_some(),
            alias_updates: self.alias_updates.len(),
            allow_list_updates: self.allow_list_updates.len(),
            version,
        }
    }
}

impl fmt::Debug for ConfigBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBatch")
            .field("name_service", &self.name_service.as_ref().map(|(a, _)| a))
            .field(
                "attestation_registry",
                &self.attestation_registry.as_ref().map(|(a, _)| a),
            )
            .field("agent_root_node", &self.agent_root_node)
            .field("club_root_node", &self.club_root_node)
            .field("agent_merkle_root", &self.agent_merkle_root)
            .field("validator_merkle_root", &self.validator_merkle_root)
            .field("alias_updates", &self.alias_updates)
            .field("allow_list_updates", &self.allow_list_updates)
            .finish()
    }
}

/// Which fields an applied batch touched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub name_service: bool,
    pub attestation_registry: bool,
    pub agent_root_node: bool,
    pub club_root_node: bool,
    pub agent_merkle_root: bool,
    pub validator_merkle_root: bool,
    pub alias_updates: usize,
    pub allow_list_updates: usize,
    /// Configuration version after the batch.
    pub version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(b: u8) -> Hash256 {
        Hash256::new([b; 32])
    }

    #[test]
    fn zero_alias_root_rejected() {
        let batch = ConfigBatch::new().alias_root(Role::Agent, Hash256::ZERO, true);
        assert_eq!(batch.validate(), Err(IdentityError::ZeroRoot("alias root")));
    }

    #[test]
    fn zero_allow_list_entry_rejected() {
        let batch = ConfigBatch::new().allow(Role::Validator, Address::ZERO, true);
        assert!(matches!(batch.validate(), Err(IdentityError::ZeroAddress(_))));
    }

    #[test]
    fn disabled_alias_is_kept_but_skipped() {
        let mut config = IdentityConfig::default();
        ConfigBatch::new()
            .alias_root(Role::Validator, node(1), true)
            .alias_root(Role::Validator, node(1), false)
            .apply_to(&mut config);
        assert_eq!(config.validator_aliases.get(&node(1)), Some(&false));
        assert!(config.ownership_roots(Role::Validator).is_empty());
    }

    #[test]
    fn ownership_roots_primary_first() {
        let mut config = IdentityConfig::default();
        ConfigBatch::new()
            .root_node(Role::Agent, node(9))
            .alias_root(Role::Agent, node(2), true)
            .apply_to(&mut config);
        assert_eq!(
            config.ownership_roots(Role::Agent),
            vec![(node(9), false), (node(2), true)]
        );
    }

    #[test]
    fn empty_batch_is_empty() {
        assert!(ConfigBatch::new().is_empty());
        assert!(!ConfigBatch::new().merkle_root(Role::Agent, node(3)).is_empty());
    }
}
