//! Service synthesis from module descriptors.
//!
//! Turns one descriptor into a concrete compose service, injecting the
//! hardening baseline, resource policy, provenance labels, and derived
//! service-discovery environment. Only a missing image is fatal; every
//! other absent field degrades to omission or a default.

use std::collections::BTreeMap;

use flotilla_common::constants::LABEL_PREFIX;
use flotilla_common::error::{FlotillaError, Result};
use flotilla_common::types::ResourcePolicy;
use serde::Serialize;

use crate::linker;
use crate::module::{ModuleDescriptor, ResourceOverrides};

/// Security options applied to every service, no opt-out.
pub const SECURITY_OPTS: &[&str] = &["no-new-privileges:true"];

/// Capability drop baseline applied to every service, no opt-out.
pub const CAP_DROP: &[&str] = &["ALL"];

/// Capability set granted to modules that publish ports without an
/// explicit `cap_add` declaration of their own.
pub const WEB_CAPABILITIES: &[&str] = &["NET_BIND_SERVICE", "SETUID", "SETGID", "DAC_OVERRIDE"];

/// A synthesized compose service. Struct field order is the YAML emission
/// order; optional and empty fields are elided from the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    /// Runtime image reference.
    pub image: String,
    /// Explicit container name, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    /// Restart policy, when declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart: Option<String>,
    /// Port mappings, copied verbatim.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// Mount specifications, copied verbatim.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// Declared environment merged over derived discovery variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Service-level network attachments, copied verbatim.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    /// Direct dependencies only, never the transitive closure.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Hardening baseline; always present.
    pub security_opt: Vec<String>,
    /// Capability drop baseline; always present.
    pub cap_drop: Vec<String>,
    /// Capabilities granted back on top of the dropped baseline.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<String>,
    /// Resource policy wrapper.
    pub deploy: Deploy,
    /// Provenance labels.
    pub labels: BTreeMap<String, String>,
}

/// Deployment policy wrapper (compose `deploy` key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deploy {
    /// Resource limits and reservations.
    pub resources: ResourcePolicy,
}

/// Synthesizes the compose service for `descriptor`, deriving discovery
/// variables from `peers` (the full resolved set).
///
/// # Errors
///
/// Fails with `MissingImage` when the descriptor has no `docker.image`.
pub fn synthesize(descriptor: &ModuleDescriptor, peers: &[&ModuleDescriptor]) -> Result<Service> {
    let docker = &descriptor.docker;
    let image = docker
        .image
        .clone()
        .ok_or_else(|| FlotillaError::MissingImage {
            module: descriptor.name.clone(),
        })?;

    let mut environment = linker::derive_env(descriptor, peers);
    for (key, value) in &docker.environment {
        let _ = environment.insert(key.clone(), value.clone());
    }

    Ok(Service {
        image,
        container_name: docker.container_name.clone(),
        restart: docker.restart.clone(),
        ports: docker.ports.clone(),
        volumes: docker.volumes.clone(),
        environment,
        networks: docker.networks.clone(),
        depends_on: descriptor.dependencies.clone(),
        security_opt: owned(SECURITY_OPTS),
        cap_drop: owned(CAP_DROP),
        cap_add: grant_capabilities(descriptor),
        deploy: Deploy {
            resources: resource_policy(docker.resources.as_ref()),
        },
        labels: provenance_labels(descriptor),
    })
}

/// Explicit `cap_add` declarations win; a module that publishes ports
/// without one receives the fixed web-service set so it can still bind
/// privileged ports under the dropped baseline.
fn grant_capabilities(descriptor: &ModuleDescriptor) -> Vec<String> {
    if !descriptor.docker.cap_add.is_empty() {
        return descriptor.docker.cap_add.clone();
    }
    if descriptor.docker.ports.is_empty() {
        return Vec::new();
    }
    owned(WEB_CAPABILITIES)
}

fn resource_policy(overrides: Option<&ResourceOverrides>) -> ResourcePolicy {
    let defaults = ResourcePolicy::default();
    match overrides {
        Some(o) => ResourcePolicy {
            limits: o.limits.clone().unwrap_or(defaults.limits),
            reservations: o.reservations.clone().unwrap_or(defaults.reservations),
        },
        None => defaults,
    }
}

fn provenance_labels(descriptor: &ModuleDescriptor) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    let _ = labels.insert(format!("{LABEL_PREFIX}.module"), descriptor.name.clone());
    let _ = labels.insert(format!("{LABEL_PREFIX}.version"), descriptor.version.clone());
    let _ = labels.insert(
        format!("{LABEL_PREFIX}.description"),
        descriptor.description.clone(),
    );
    let _ = labels.insert(format!("{LABEL_PREFIX}.hardened"), "true".to_owned());
    labels
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_owned()).collect()
}
