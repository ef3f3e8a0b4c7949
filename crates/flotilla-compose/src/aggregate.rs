//! Shared network and volume aggregation.
//!
//! Unions the resource names declared across the resolved set and
//! synthesizes their definitions. The implicit shared network is always
//! present so services can reach each other by alias; volumes get no such
//! implicit entry.

use std::collections::{BTreeMap, BTreeSet};

use flotilla_common::constants::{LABEL_PREFIX, SHARED_NETWORK};
use serde::Serialize;

use crate::module::ModuleDescriptor;

/// Definition of a generated bridge network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkDef {
    /// Network driver; always `bridge`.
    pub driver: String,
    /// Explicit engine-level name echoing the key.
    pub name: String,
    /// Provenance labels.
    pub labels: BTreeMap<String, String>,
}

/// Definition of a generated named volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeDef {
    /// Volume driver; always `local`.
    pub driver: String,
    /// Provenance labels.
    pub labels: BTreeMap<String, String>,
}

/// Unions every module's declared network names (top-level membership and
/// service-level attachments) plus the always-present shared network.
/// Sorted by name, stable across runs.
#[must_use]
pub fn aggregate_networks(modules: &[&ModuleDescriptor]) -> BTreeMap<String, NetworkDef> {
    let mut names: BTreeSet<String> = BTreeSet::new();
    let _ = names.insert(SHARED_NETWORK.to_owned());
    for module in modules {
        names.extend(module.networks.iter().cloned());
        names.extend(module.docker.networks.iter().cloned());
    }

    names
        .into_iter()
        .map(|name| {
            let def = NetworkDef {
                driver: "bridge".to_owned(),
                name: name.clone(),
                labels: resource_labels("network"),
            };
            (name, def)
        })
        .collect()
}

/// Unions every module's declared named volumes. No implicit volume is
/// added. Sorted by name, stable across runs.
#[must_use]
pub fn aggregate_volumes(modules: &[&ModuleDescriptor]) -> BTreeMap<String, VolumeDef> {
    let names: BTreeSet<String> = modules
        .iter()
        .flat_map(|module| module.volumes.iter().cloned())
        .collect();

    names
        .into_iter()
        .map(|name| {
            let def = VolumeDef {
                driver: "local".to_owned(),
                labels: resource_labels("volume"),
            };
            (name, def)
        })
        .collect()
}

fn resource_labels(kind: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    let _ = labels.insert(format!("{LABEL_PREFIX}.{kind}"), "true".to_owned());
    let _ = labels.insert(format!("{LABEL_PREFIX}.created"), "auto-generated".to_owned());
    labels
}
