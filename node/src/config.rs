//! Node configuration with TOML file support.
//!
//! Addresses and hashes are kept as hex strings so the file stays readable;
//! they are parsed (and zero values rejected) by [`NodeConfig::validate`] and
//! the typed accessors.

use agij_identity::ConfigBatch;
use agij_types::{Address, Hash256, Role, ValidationParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a validation node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Address allowed to run governance operations.
    #[serde(default)]
    pub governance: String,

    /// Address of the job registry; the only caller allowed to `start` a job.
    #[serde(default)]
    pub job_registry: String,

    /// Capacity of the service command queue.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Where module state is persisted on shutdown and restored on start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,

    #[serde(default)]
    pub enable_metrics: bool,

    /// Block interval of the in-process development chain.
    #[serde(default = "default_block_time_secs")]
    pub block_time_secs: u64,

    /// Initial validator pool. `stake` seeds the in-memory stake ledger.
    #[serde(default)]
    pub validators: Vec<ValidatorEntry>,

    #[serde(default)]
    pub identity: IdentitySettings,

    #[serde(default)]
    pub params: ValidationParams,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorEntry {
    pub address: String,
    #[serde(default)]
    pub stake: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub root: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Identity gating applied as one batch at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation_registry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_root_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_root_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_merkle_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_merkle_root: Option<String>,
    #[serde(default)]
    pub additional_agents: Vec<String>,
    #[serde(default)]
    pub additional_validators: Vec<String>,
    #[serde(default)]
    pub agent_aliases: Vec<AliasEntry>,
    #[serde(default)]
    pub club_aliases: Vec<AliasEntry>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_command_buffer() -> usize {
    256
}

fn default_block_time_secs() -> u64 {
    12
}

fn default_true() -> bool {
    true
}

// ── Parsing helpers ────────────────────────────────────────────────────

fn parse_address(field: &str, value: &str) -> Result<Address, NodeError> {
    let address: Address = value.parse().map_err(|e| NodeError::invalid(field, e))?;
    if address.is_zero() {
        return Err(NodeError::invalid(field, "zero address"));
    }
    Ok(address)
}

fn parse_hash(field: &str, value: &str) -> Result<Hash256, NodeError> {
    let hash: Hash256 = value.parse().map_err(|e| NodeError::invalid(field, e))?;
    if hash.is_zero() {
        return Err(NodeError::invalid(field, "zero hash"));
    }
    Ok(hash)
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Parse every field and check parameter consistency.
    pub fn validate(&self) -> Result<(), NodeError> {
        self.governance_address()?;
        self.job_registry_address()?;
        self.validator_pool()?;
        self.identity_batch()?;
        self.params
            .validate()
            .map_err(|e| NodeError::invalid("params", e))?;
        if self.command_buffer == 0 {
            return Err(NodeError::invalid("command_buffer", "must be positive"));
        }
        Ok(())
    }

    pub fn governance_address(&self) -> Result<Address, NodeError> {
        parse_address("governance", &self.governance)
    }

    pub fn job_registry_address(&self) -> Result<Address, NodeError> {
        parse_address("job_registry", &self.job_registry)
    }

    /// Validator addresses with their seed stakes, in file order.
    pub fn validator_pool(&self) -> Result<Vec<(Address, u128)>, NodeError> {
        self.validators
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let address = parse_address(&format!("validators[{i}].address"), &entry.address)?;
                Ok((address, u128::from(entry.stake)))
            })
            .collect()
    }

    /// The identity section as a configuration batch. Service handles are
    /// not part of the file and are attached by the caller.
    pub fn identity_batch(&self) -> Result<ConfigBatch, NodeError> {
        let identity = &self.identity;
        let mut batch = ConfigBatch::new();

        let roots = [
            (Role::Agent, "identity.agent_root_node", &identity.agent_root_node),
            (Role::Validator, "identity.club_root_node", &identity.club_root_node),
        ];
        for (role, field, value) in roots {
            if let Some(value) = value {
                batch = batch.root_node(role, parse_hash(field, value)?);
            }
        }

        let merkle = [
            (Role::Agent, "identity.agent_merkle_root", &identity.agent_merkle_root),
            (Role::Validator, "identity.validator_merkle_root", &identity.validator_merkle_root),
        ];
        for (role, field, value) in merkle {
            if let Some(value) = value {
                batch = batch.merkle_root(role, parse_hash(field, value)?);
            }
        }

        let aliases = [
            (Role::Agent, "identity.agent_aliases", &identity.agent_aliases),
            (Role::Validator, "identity.club_aliases", &identity.club_aliases),
        ];
        for (role, field, entries) in aliases {
            for (i, entry) in entries.iter().enumerate() {
                let root = parse_hash(&format!("{field}[{i}]"), &entry.root)?;
                batch = batch.alias_root(role, root, entry.enabled);
            }
        }

        let allow = [
            (Role::Agent, "identity.additional_agents", &identity.additional_agents),
            (Role::Validator, "identity.additional_validators", &identity.additional_validators),
        ];
        for (role, field, entries) in allow {
            for (i, value) in entries.iter().enumerate() {
                let address = parse_address(&format!("{field}[{i}]"), value)?;
                batch = batch.allow(role, address, true);
            }
        }

        Ok(batch)
    }

    pub fn name_service_address(&self) -> Result<Option<Address>, NodeError> {
        self.identity
            .name_service
            .as_deref()
            .map(|value| parse_address("identity.name_service", value))
            .transpose()
    }

    pub fn attestation_registry_address(&self) -> Result<Option<Address>, NodeError> {
        self.identity
            .attestation_registry
            .as_deref()
            .map(|value| parse_address("identity.attestation_registry", value))
            .transpose()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            governance: String::new(),
            job_registry: String::new(),
            command_buffer: default_command_buffer(),
            snapshot_path: None,
            enable_metrics: false,
            block_time_secs: default_block_time_secs(),
            validators: Vec::new(),
            identity: IdentitySettings::default(),
            params: ValidationParams::default(),
        }
    }
}
