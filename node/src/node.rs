//! Building a [`ValidationModule`] from configuration, and persisting it.
//!
//! A node starts from the snapshot file when one exists; otherwise it builds
//! a fresh module, installs the configured validator pool, and applies the
//! identity section as a single batch.

use agij_identity::{AttestationService, NameService};
use agij_validation::{Collaborators, ModuleSnapshot, ValidationModule};
use std::path::Path;
use std::sync::Arc;

use crate::{NodeConfig, NodeError};

/// Identity service handles. Their addresses come from the config file.
#[derive(Clone, Default)]
pub struct IdentityServices {
    pub name_service: Option<Arc<dyn NameService>>,
    pub attestations: Option<Arc<dyn AttestationService>>,
}

/// Build a fresh module from `config`.
pub fn build_module(
    config: &NodeConfig,
    collaborators: Collaborators,
    services: &IdentityServices,
) -> Result<ValidationModule, NodeError> {
    config.validate()?;
    let governance = config.governance_address()?;
    let mut module = ValidationModule::new(governance, config.params.clone(), collaborators)?;

    let pool = config
        .validator_pool()?
        .into_iter()
        .map(|(address, _)| address)
        .collect();
    module.set_validator_pool(governance, pool)?;

    let mut batch = config.identity_batch()?;
    if let (Some(address), Some(service)) = (config.name_service_address()?, &services.name_service) {
        batch = batch.name_service(address, Arc::clone(service));
    }
    if let (Some(address), Some(service)) =
        (config.attestation_registry_address()?, &services.attestations)
    {
        batch = batch.attestation_registry(address, Arc::clone(service));
    }
    if !batch.is_empty() {
        module.apply_identity_batch(governance, batch)?;
    }
    module.drain_events();

    tracing::info!(
        %governance,
        pool = module.pool().len(),
        identity_version = module.identity().version(),
        "validation module built from config"
    );
    Ok(module)
}

/// Restore from `config.snapshot_path` if the file exists, otherwise build.
pub fn load_or_build(
    config: &NodeConfig,
    collaborators: Collaborators,
    services: &IdentityServices,
) -> Result<ValidationModule, NodeError> {
    match &config.snapshot_path {
        Some(path) if path.exists() => {
            let module = load_snapshot(path, collaborators, services)?;
            tracing::info!(path = %path.display(), rounds = module.open_rounds(), "restored from snapshot");
            Ok(module)
        }
        _ => build_module(config, collaborators, services),
    }
}

pub fn load_snapshot(
    path: &Path,
    collaborators: Collaborators,
    services: &IdentityServices,
) -> Result<ValidationModule, NodeError> {
    let bytes = std::fs::read(path)?;
    let snapshot = ModuleSnapshot::from_bytes(&bytes)?;
    Ok(ValidationModule::restore(
        snapshot,
        collaborators,
        services.name_service.clone(),
        services.attestations.clone(),
    )?)
}

/// Write the module snapshot through a temporary sibling file so a crash
/// mid-write never leaves a truncated snapshot behind.
pub fn save_snapshot(module: &ValidationModule, path: &Path) -> Result<(), NodeError> {
    let bytes = module.snapshot().to_bytes()?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, &bytes)?;
    std::fs::rename(&tmp, path)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "snapshot saved");
    Ok(())
}
