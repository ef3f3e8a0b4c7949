//! Filesystem store for module descriptors.
//!
//! Lowest-level I/O leaf: maps a module name to its `module.yml` location
//! under the configured root and reads one descriptor at a time.

use std::path::PathBuf;

use flotilla_common::constants::MODULE_FILE_NAME;
use flotilla_common::error::{FlotillaError, Result};

use crate::module::ModuleDescriptor;

/// Reads module descriptors from a root directory, one subdirectory per
/// module.
#[derive(Debug)]
pub struct DescriptorStore {
    root: PathBuf,
}

impl DescriptorStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Expected descriptor location for `name`.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name).join(MODULE_FILE_NAME)
    }

    /// Reads and validates the descriptor for `name`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when no descriptor exists at the expected
    /// location, `Io` when the file cannot be read, or `Descriptor` when
    /// the document fails to parse or the module lists itself as a
    /// dependency.
    pub fn read(&self, name: &str) -> Result<ModuleDescriptor> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(FlotillaError::NotFound {
                kind: "module",
                id: format!("{name} (expected at {})", path.display()),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| FlotillaError::Io {
            path: path.clone(),
            source,
        })?;

        let mut descriptor: ModuleDescriptor =
            serde_yaml::from_str(&content).map_err(|e| FlotillaError::Descriptor {
                module: name.to_owned(),
                message: e.to_string(),
            })?;
        descriptor.name = name.to_owned();

        if descriptor.dependencies.iter().any(|dep| dep == name) {
            return Err(FlotillaError::Descriptor {
                module: name.to_owned(),
                message: "dependency list references the module itself".into(),
            });
        }

        tracing::debug!(module = name, path = %path.display(), "descriptor loaded");
        Ok(descriptor)
    }

    /// Names of every module with a descriptor under the root, sorted for
    /// deterministic batch loads.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be read.
    pub fn available(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| FlotillaError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| FlotillaError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_dir() || !path.join(MODULE_FILE_NAME).exists() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
