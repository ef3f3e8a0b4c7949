//! Domain primitive types used across the Flotilla workspace.

use serde::{Deserialize, Serialize};

/// A cpus/memory pair used for container limits or reservations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// CPU share as a fractional core count (e.g. "0.5").
    pub cpus: String,
    /// Memory size with unit suffix (e.g. "512M").
    pub memory: String,
}

impl ResourceSpec {
    /// Creates a resource spec from cpus and memory values.
    #[must_use]
    pub fn new(cpus: impl Into<String>, memory: impl Into<String>) -> Self {
        Self {
            cpus: cpus.into(),
            memory: memory.into(),
        }
    }
}

/// Limit and reservation pair applied to a synthesized service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePolicy {
    /// Hard resource ceiling.
    pub limits: ResourceSpec,
    /// Guaranteed resource floor.
    pub reservations: ResourceSpec,
}

impl Default for ResourcePolicy {
    fn default() -> Self {
        Self {
            limits: ResourceSpec::new("0.5", "512M"),
            reservations: ResourceSpec::new("0.25", "256M"),
        }
    }
}
