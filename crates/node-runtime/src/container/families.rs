//! # Family Loading
//!
//! Registers each enabled family once, with its own in-memory store.

use super::config::FamilyConfig;
use lf_02_family_core::{in_memory_store_factory, ConfigurationError, FamilyRegistry};
use lf_03_clinical::{ApplyMode, ClinicalFamily};
use lf_04_arcade::ArcadeFamily;
use std::sync::Arc;
use tracing::info;

/// Build the registry for the enabled families.
///
/// An unknown name or a family listed twice aborts loading.
pub fn load_families(config: &FamilyConfig) -> Result<FamilyRegistry, ConfigurationError> {
    let mut registry = FamilyRegistry::new();

    for name in &config.enabled {
        match name.as_str() {
            "clinical" => {
                let mode = ApplyMode::from_legacy_flag(config.legacy_apply);
                registry.register_family(Arc::new(ClinicalFamily::new(mode)), in_memory_store_factory())?
            }
            "arcade" => registry.register_family(Arc::new(ArcadeFamily), in_memory_store_factory())?,
            other => return Err(ConfigurationError::UnknownFamily(other.to_string())),
        }
    }
    registry.validate_complete()?;

    info!(families = ?config.enabled, "Families loaded");
    Ok(registry)
}
