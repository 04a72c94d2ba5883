// fmcw_sim/src/simulation/config/resolver.rs

use super::catalog::PrefabCatalog;
use super::structs::{SensorSection, Simulation};
use crate::error::SimError;
use figment::{providers::Serialized, Figment};
use fmcw_core::config::SensorConfig;

/// Resolves the `[sensor]` table into a complete `SensorConfig`.
///
/// Layers, lowest priority first:
/// 1. parameters derived from `simulation.nominal_range`;
/// 2. the catalog prefab named by `from`, if any;
/// 3. `simulation.seed`, if any;
/// 4. the remaining keys of the `[sensor]` table.
///
/// Tables are merged key by key, so an override of one field of
/// `field_of_view` keeps the other fields of the layers below.
pub fn resolve_sensor_config(
    section: &SensorSection,
    simulation: &Simulation,
    catalog: &PrefabCatalog,
) -> Result<SensorConfig, SimError> {
    let mut figment = Figment::from(Serialized::defaults(SensorConfig::from_nominal_range(
        simulation.nominal_range,
    )));

    if let Some(key) = &section.from {
        let prefab = catalog
            .get(key)
            .ok_or_else(|| SimError::UnknownPrefab(key.clone()))?;
        figment = figment.merge(Serialized::defaults(prefab));
    }

    if let Some(seed) = simulation.seed {
        figment = figment.merge(Serialized::default("seed", seed));
    }

    let config: SensorConfig = figment
        .merge(Serialized::defaults(&section.overrides))
        .extract()?;
    Ok(config)
}
