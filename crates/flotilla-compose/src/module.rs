//! Module descriptor model.
//!
//! A module is a unit of deployable configuration: a runtime image,
//! dependencies on other modules, and declared shared networks and volumes.
//! Descriptors are deserialized from `module.yml` files; every optional
//! field degrades to a documented default rather than an error.

use std::collections::BTreeMap;

use flotilla_common::types::ResourceSpec;
use serde::{Deserialize, Deserializer, Serialize};

/// Role a module plays in the deployment, driving service-discovery wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleRole {
    /// Application tier consuming datastores and caches.
    Application,
    /// Relational datastore.
    Database,
    /// In-memory cache.
    Cache,
    /// Reverse proxy fronting application backends.
    Proxy,
}

/// Declarative descriptor for one module, loaded from its `module.yml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleDescriptor {
    /// Module name; equals the directory name and is filled in by the
    /// store after parsing, never read from the document itself.
    #[serde(skip)]
    pub name: String,
    /// Module version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Role driving cross-module environment derivation.
    #[serde(default)]
    pub role: Option<ModuleRole>,
    /// Direct dependencies on other modules, in declaration order.
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub dependencies: Vec<String>,
    /// Shared networks this module wants membership in.
    #[serde(default)]
    pub networks: Vec<String>,
    /// Named volumes this module declares.
    #[serde(default)]
    pub volumes: Vec<String>,
    /// Container-level configuration.
    #[serde(default)]
    pub docker: DockerSection,
}

impl Default for ModuleDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: default_version(),
            description: String::new(),
            role: None,
            dependencies: Vec::new(),
            networks: Vec::new(),
            volumes: Vec::new(),
            docker: DockerSection::default(),
        }
    }
}

impl ModuleDescriptor {
    /// Network alias peers use to reach this module: the explicit
    /// container name when declared, the module name otherwise.
    #[must_use]
    pub fn network_alias(&self) -> &str {
        self.docker.container_name.as_deref().unwrap_or(&self.name)
    }

    /// Container-side port of the first declared port mapping, if any.
    #[must_use]
    pub fn first_container_port(&self) -> Option<&str> {
        let mapping = self.docker.ports.first()?;
        mapping.rsplit(':').next()
    }
}

fn default_version() -> String {
    "1.0.0".to_owned()
}

/// Container configuration nested under the descriptor's `docker` key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerSection {
    /// Runtime image reference. Required; its absence is fatal at load
    /// (batch mode) or synthesis, never a default.
    pub image: Option<String>,
    /// Explicit container name, used as the network alias by peers.
    pub container_name: Option<String>,
    /// Restart policy string, copied verbatim into the service.
    pub restart: Option<String>,
    /// Port mappings ("host:container").
    #[serde(default)]
    pub ports: Vec<String>,
    /// Mount specifications, copied verbatim into the service.
    #[serde(default)]
    pub volumes: Vec<String>,
    /// Declared environment variables. These win over derived
    /// service-discovery variables on key collision.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// Service-level network attachments.
    #[serde(default)]
    pub networks: Vec<String>,
    /// Explicit capability grants layered on top of the dropped baseline.
    #[serde(default)]
    pub cap_add: Vec<String>,
    /// Resource limit/reservation overrides.
    pub resources: Option<ResourceOverrides>,
}

/// Optional overrides for the default resource policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceOverrides {
    /// Override for the hard resource ceiling.
    pub limits: Option<ResourceSpec>,
    /// Override for the guaranteed floor.
    pub reservations: Option<ResourceSpec>,
}

/// Accepts a YAML sequence of strings; any other shape yields the empty
/// list. Hand-edited descriptors with a scalar or map in the dependency
/// slot degrade silently instead of failing the load.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    match value {
        serde_yaml::Value::Sequence(seq) => Ok(seq
            .into_iter()
            .filter_map(|item| match item {
                serde_yaml::Value::String(s) => Some(s),
                _ => None,
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}
