//! Unified error types for the Flotilla workspace.
//!
//! All crates report failures through this shared enum; optional descriptor
//! fields never produce errors and degrade to documented defaults instead.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum FlotillaError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A module descriptor exists but cannot be used.
    #[error("invalid descriptor for module \"{module}\": {message}")]
    Descriptor {
        /// Module whose descriptor is invalid.
        module: String,
        /// Description of the defect.
        message: String,
    },

    /// A module descriptor lacks the required image reference.
    #[error("module \"{module}\" is missing the required docker.image field")]
    MissingImage {
        /// Module with no image declared.
        module: String,
    },

    /// The dependency graph contains a cycle.
    #[error("cyclic dependency detected: {}", join_cycle(.members))]
    DependencyCycle {
        /// Modules along the cycle, ending on the module that closed it.
        members: Vec<String>,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },
}

fn join_cycle(members: &[String]) -> String {
    members.join(" -> ")
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, FlotillaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_display_names_members() {
        let err = FlotillaError::DependencyCycle {
            members: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic dependency detected: a -> b -> a");
    }

    #[test]
    fn missing_image_display_names_module() {
        let err = FlotillaError::MissingImage {
            module: "broken".into(),
        };
        assert!(err.to_string().contains("broken"));
        assert!(err.to_string().contains("docker.image"));
    }

    #[test]
    fn not_found_display_includes_kind_and_id() {
        let err = FlotillaError::NotFound {
            kind: "module",
            id: "ghost".into(),
        };
        assert_eq!(err.to_string(), "module not found: ghost");
    }
}
