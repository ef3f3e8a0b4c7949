//! Manifest assembly and serialization.
//!
//! Combines synthesized services, networks, and volumes into one compose
//! document. Services keep resolution order in the serialized map; empty
//! `networks`/`volumes` sections are elided entirely. Serialization is
//! deterministic: equal manifests render to byte-identical YAML.

use std::collections::BTreeMap;
use std::path::Path;

use flotilla_common::error::{FlotillaError, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::aggregate::{self, NetworkDef, VolumeDef};
use crate::module::ModuleDescriptor;
use crate::registry::ModuleRegistry;
use crate::service::{self, Service};

/// The assembled deployment manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Services keyed by module name, in resolution order.
    #[serde(serialize_with = "ordered_services")]
    pub services: Vec<(String, Service)>,
    /// Generated networks; elided from the document when empty.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub networks: BTreeMap<String, NetworkDef>,
    /// Generated named volumes; elided from the document when empty.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub volumes: BTreeMap<String, VolumeDef>,
}

/// Serializes the service list as a map without losing resolution order.
fn ordered_services<S>(
    services: &[(String, Service)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(services.len()))?;
    for (name, svc) in services {
        map.serialize_entry(name, svc)?;
    }
    map.end()
}

/// Assembles the manifest for `order`, synthesizing every module in
/// resolution order and aggregating shared resources once over the set.
///
/// # Errors
///
/// Fails if a module in the order cannot be loaded or lacks an image; no
/// partial manifest is produced.
pub fn assemble(registry: &mut ModuleRegistry, order: &[String]) -> Result<Manifest> {
    for name in order {
        let _ = registry.load(name)?;
    }
    let modules: Vec<&ModuleDescriptor> = order
        .iter()
        .filter_map(|name| registry.get(name))
        .collect();

    let mut services = Vec::with_capacity(modules.len());
    for module in &modules {
        tracing::debug!(module = module.name.as_str(), "synthesizing service");
        let svc = service::synthesize(module, &modules)?;
        services.push((module.name.clone(), svc));
    }

    Ok(Manifest {
        services,
        networks: aggregate::aggregate_networks(&modules),
        volumes: aggregate::aggregate_volumes(&modules),
    })
}

impl Manifest {
    /// Renders the manifest to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Serializes and writes the manifest to `path`. The document is
    /// rendered fully in memory first, so a failed run leaves no partial
    /// file behind.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write(&self, path: &Path) -> Result<()> {
        let rendered = self.to_yaml()?;
        tracing::info!(path = %path.display(), services = self.services.len(), "writing manifest");
        std::fs::write(path, rendered).map_err(|source| FlotillaError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
