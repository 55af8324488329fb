//! The identity verifier.

use crate::config::{ConfigBatch, ConfigSummary, IdentityConfig};
use crate::error::IdentityError;
use crate::events::{FailureReason, IdentityEvent};
use crate::service::{AttestationService, NameService};
use agij_crypto::{merkle_leaf, sub_node, verify_merkle_proof};
use agij_stake::ReputationLedger;
use agij_types::{Address, Hash256, Role};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which check admitted an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationPath {
    AllowList,
    Merkle,
    /// Registered owner of the label's node.
    Ownership,
    /// The node's resolver points at the address.
    Resolver,
    /// An attestation exists for the address under the node.
    Attestation,
}

/// Result of a single verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub authorized: bool,
    /// Node the label resolved to: the matching root's sub-node, or the
    /// primary root's sub-node when nothing matched (zero if no label).
    pub node: Hash256,
    pub path: Option<VerificationPath>,
    /// Matched under an alias root rather than the primary root.
    pub via_alias: bool,
}

impl VerificationOutcome {
    fn denied(node: Hash256) -> Self {
        Self {
            authorized: false,
            node,
            path: None,
            via_alias: false,
        }
    }

    fn granted(node: Hash256, path: VerificationPath, via_alias: bool) -> Self {
        Self {
            authorized: true,
            node,
            path: Some(path),
            via_alias,
        }
    }

    /// True when authorization came from an attestation rather than from
    /// ownership, resolver, allow-list, or merkle membership.
    pub fn used_fallback(&self) -> bool {
        self.path == Some(VerificationPath::Attestation)
    }
}

/// Decides whether an address may act as an agent or validator.
///
/// Holds the versioned [`IdentityConfig`] and handles to the external
/// services it names. All configuration changes go through
/// [`IdentityRegistry::apply_batch`].
pub struct IdentityRegistry {
    config: IdentityConfig,
    name_service: Option<Arc<dyn NameService>>,
    attestations: Option<Arc<dyn AttestationService>>,
    reputation: Option<Arc<dyn ReputationLedger>>,
    pending_events: Vec<IdentityEvent>,
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self {
            config: IdentityConfig::default(),
            name_service: None,
            attestations: None,
            reputation: None,
            pending_events: Vec::new(),
        }
    }
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the reputation ledger whose blacklist gates every check.
    pub fn with_reputation(mut self, reputation: Arc<dyn ReputationLedger>) -> Self {
        self.reputation = Some(reputation);
        self
    }

    pub fn set_reputation(&mut self, reputation: Arc<dyn ReputationLedger>) {
        self.reputation = Some(reputation);
    }

    /// Rebuild from a persisted configuration. Service handles are not
    /// persisted; reattach them with [`Self::attach_services`].
    pub fn restore(config: IdentityConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Reattach service handles without touching the configuration version.
    pub fn attach_services(
        &mut self,
        name_service: Option<Arc<dyn NameService>>,
        attestations: Option<Arc<dyn AttestationService>>,
    ) {
        self.name_service = name_service;
        self.attestations = attestations;
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Current configuration version.
    pub fn version(&self) -> u64 {
        self.config.version
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<IdentityEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Validate and apply `batch` atomically.
    ///
    /// Any invalid value rejects the whole batch and leaves the configuration
    /// untouched. A non-empty batch bumps the version.
    pub fn apply_batch(&mut self, batch: ConfigBatch) -> Result<ConfigSummary, IdentityError> {
        batch.validate()?;
        if batch.is_empty() {
            return Ok(batch.summary(self.config.version));
        }

        batch.apply_to(&mut self.config);
        if let Some((_, service)) = &batch.name_service {
            self.name_service = Some(Arc::clone(service));
        }
        if let Some((_, service)) = &batch.attestation_registry {
            self.attestations = Some(Arc::clone(service));
        }
        self.config.version += 1;

        for (role, address, allowed) in &batch.allow_list_updates {
            self.pending_events.push(IdentityEvent::AllowListUpdated {
                role: *role,
                address: *address,
                allowed: *allowed,
            });
        }
        let summary = batch.summary(self.config.version);
        tracing::info!(version = summary.version, ?summary, "identity configuration applied");
        self.pending_events
            .push(IdentityEvent::ConfigurationApplied(summary.clone()));
        Ok(summary)
    }

    pub fn set_name_service(
        &mut self,
        address: Address,
        service: Arc<dyn NameService>,
    ) -> Result<ConfigSummary, IdentityError> {
        self.apply_batch(ConfigBatch::new().name_service(address, service))
    }

    pub fn set_attestation_registry(
        &mut self,
        address: Address,
        service: Arc<dyn AttestationService>,
    ) -> Result<ConfigSummary, IdentityError> {
        self.apply_batch(ConfigBatch::new().attestation_registry(address, service))
    }

    pub fn set_root_node(&mut self, role: Role, node: Hash256) -> Result<ConfigSummary, IdentityError> {
        self.apply_batch(ConfigBatch::new().root_node(role, node))
    }

    pub fn set_merkle_root(&mut self, role: Role, root: Hash256) -> Result<ConfigSummary, IdentityError> {
        self.apply_batch(ConfigBatch::new().merkle_root(role, root))
    }

    pub fn set_alias_root(
        &mut self,
        role: Role,
        root: Hash256,
        enabled: bool,
    ) -> Result<ConfigSummary, IdentityError> {
        self.apply_batch(ConfigBatch::new().alias_root(role, root, enabled))
    }

    pub fn add_additional(&mut self, role: Role, address: Address) -> Result<ConfigSummary, IdentityError> {
        self.apply_batch(ConfigBatch::new().allow(role, address, true))
    }

    pub fn remove_additional(
        &mut self,
        role: Role,
        address: Address,
    ) -> Result<ConfigSummary, IdentityError> {
        self.apply_batch(ConfigBatch::new().allow(role, address, false))
    }

    /// Invalidate every cached verification without changing any field.
    pub fn bump_version(&mut self) -> u64 {
        self.config.version += 1;
        let version = self.config.version;
        tracing::info!(version, "identity cache version bumped");
        self.pending_events
            .push(IdentityEvent::CacheVersionBumped { version });
        version
    }

    /// Shorthand for `verify(..).authorized`.
    pub fn is_authorized(&mut self, role: Role, address: &Address, label: &str, proof: &[Hash256]) -> bool {
        self.verify(role, address, label, proof).authorized
    }

    /// Run the full verification order for `address` claiming `label`.
    pub fn verify(
        &mut self,
        role: Role,
        address: &Address,
        label: &str,
        proof: &[Hash256],
    ) -> VerificationOutcome {
        let primary = self.config.root_node(role);
        let default_node = if label.is_empty() || primary.is_zero() {
            Hash256::ZERO
        } else {
            sub_node(&primary, label)
        };

        if self
            .reputation
            .as_ref()
            .is_some_and(|rep| rep.is_blacklisted(address))
        {
            return self.fail(role, address, label, default_node, FailureReason::Blacklisted);
        }

        if self.config.is_additional(role, address) {
            let outcome = VerificationOutcome::granted(default_node, VerificationPath::AllowList, false);
            return self.succeed(role, address, label, outcome);
        }

        let merkle_root = self.config.merkle_root(role);
        if !merkle_root.is_zero() && verify_merkle_proof(proof, &merkle_root, &merkle_leaf(address, label)) {
            let outcome = VerificationOutcome::granted(default_node, VerificationPath::Merkle, false);
            return self.succeed(role, address, label, outcome);
        }

        if !label.is_empty() {
            for (root, via_alias) in self.config.ownership_roots(role) {
                let node = sub_node(&root, label);
                if let Some(path) = self.check_node(role, address, &node) {
                    let outcome = VerificationOutcome::granted(node, path, via_alias);
                    return self.succeed(role, address, label, outcome);
                }
            }
        }

        self.fail(role, address, label, default_node, FailureReason::NoMatch)
    }

    /// Ownership, resolver, then attestation under a single node.
    fn check_node(&mut self, role: Role, address: &Address, node: &Hash256) -> Option<VerificationPath> {
        if let Some(names) = self.name_service.clone() {
            match names.owner_of(node) {
                Ok(Some(owner)) if owner == *address => return Some(VerificationPath::Ownership),
                Ok(_) => {}
                Err(err) => self.recover(role, address, node, err.to_string()),
            }
            match names.resolve_addr(node) {
                Ok(Some(resolved)) if resolved == *address => return Some(VerificationPath::Resolver),
                Ok(_) => {}
                Err(err) => self.recover(role, address, node, err.to_string()),
            }
        }
        if let Some(attestations) = &self.attestations {
            if attestations.is_attested(node, role, address) {
                return Some(VerificationPath::Attestation);
            }
        }
        None
    }

    fn recover(&mut self, role: Role, address: &Address, node: &Hash256, reason: String) {
        tracing::warn!(%role, %address, %node, %reason, "name service fault, trying fallbacks");
        self.pending_events.push(IdentityEvent::RecoveryInitiated {
            role,
            address: *address,
            node: *node,
            reason,
        });
    }

    fn succeed(
        &mut self,
        role: Role,
        address: &Address,
        label: &str,
        outcome: VerificationOutcome,
    ) -> VerificationOutcome {
        if let Some(path) = outcome.path {
            tracing::debug!(%role, %address, label, ?path, via_alias = outcome.via_alias, "identity verified");
            self.pending_events.push(IdentityEvent::Verified {
                role,
                address: *address,
                node: outcome.node,
                label: label.to_string(),
                path,
            });
        }
        outcome
    }

    fn fail(
        &mut self,
        role: Role,
        address: &Address,
        label: &str,
        node: Hash256,
        reason: FailureReason,
    ) -> VerificationOutcome {
        tracing::warn!(%role, %address, label, ?reason, "identity verification failed");
        self.pending_events.push(IdentityEvent::VerificationFailed {
            role,
            address: *address,
            label: label.to_string(),
            reason,
        });
        VerificationOutcome::denied(node)
    }
}
