//! Module registry: descriptor cache and dependency lookups.
//!
//! One registry is owned by one generation run. Descriptors are loaded
//! lazily on first reference and never evicted, so each `module.yml` is
//! read at most once per invocation.

use std::collections::HashMap;

use flotilla_common::error::{FlotillaError, Result};

use crate::module::ModuleDescriptor;
use crate::store::DescriptorStore;

/// Cache of loaded descriptors keyed by module name.
#[derive(Debug)]
pub struct ModuleRegistry {
    store: DescriptorStore,
    cache: HashMap<String, ModuleDescriptor>,
}

impl ModuleRegistry {
    /// Creates a registry backed by `store`.
    #[must_use]
    pub fn new(store: DescriptorStore) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    /// Loads the descriptor for `name`, reading it from the store on first
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor is missing or malformed.
    pub fn load(&mut self, name: &str) -> Result<&ModuleDescriptor> {
        if !self.cache.contains_key(name) {
            let descriptor = self.store.read(name)?;
            let _ = self.cache.insert(name.to_owned(), descriptor);
        }
        self.cache.get(name).ok_or_else(|| FlotillaError::NotFound {
            kind: "module",
            id: name.to_owned(),
        })
    }

    /// Loads every available module under the store root.
    ///
    /// A malformed descriptor, or one missing `docker.image`, aborts the
    /// whole batch with an error naming the offending module; partial
    /// success is never returned. The returned names are sorted.
    ///
    /// # Errors
    ///
    /// Returns the first load or validation failure encountered.
    pub fn load_all(&mut self) -> Result<Vec<String>> {
        let names = self.store.available()?;
        for name in &names {
            let descriptor = self.load(name)?;
            if descriptor.docker.image.is_none() {
                return Err(FlotillaError::MissingImage {
                    module: name.clone(),
                });
            }
        }
        tracing::info!(count = names.len(), "loaded all modules");
        Ok(names)
    }

    /// Declared direct dependencies of `name`, loading on demand.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor cannot be loaded.
    pub fn dependencies(&mut self, name: &str) -> Result<Vec<String>> {
        Ok(self.load(name)?.dependencies.clone())
    }

    /// Cached descriptor lookup; performs no I/O.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.cache.get(name)
    }

    /// Names of every module available under the store root.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be read.
    pub fn available(&self) -> Result<Vec<String>> {
        self.store.available()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use flotilla_common::constants::MODULE_FILE_NAME;

    use super::*;

    fn write_module(root: &std::path::Path, name: &str, yaml: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).expect("create module dir");
        fs::write(dir.join(MODULE_FILE_NAME), yaml).expect("write descriptor");
    }

    #[test]
    fn load_caches_first_read() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_module(tmp.path(), "db", "docker:\n  image: postgres:16\n");
        let mut registry = ModuleRegistry::new(DescriptorStore::new(tmp.path()));

        let _ = registry.load("db").expect("first load");

        // Corrupt the file; a cached registry never re-reads it.
        write_module(tmp.path(), "db", "docker: [broken\n");
        let descriptor = registry.load("db").expect("cached load");
        assert_eq!(descriptor.docker.image.as_deref(), Some("postgres:16"));
    }

    #[test]
    fn load_missing_module_fails() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut registry = ModuleRegistry::new(DescriptorStore::new(tmp.path()));
        assert!(registry.load("ghost").is_err());
    }

    #[test]
    fn load_all_returns_sorted_names() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_module(tmp.path(), "web", "docker:\n  image: nginx\n");
        write_module(tmp.path(), "app", "docker:\n  image: app\n");
        let mut registry = ModuleRegistry::new(DescriptorStore::new(tmp.path()));

        let names = registry.load_all().expect("should load");
        assert_eq!(names, vec!["app", "web"]);
    }

    #[test]
    fn load_all_aborts_on_missing_image() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_module(tmp.path(), "ok", "docker:\n  image: img\n");
        write_module(tmp.path(), "shell", "description: no image here\n");
        let mut registry = ModuleRegistry::new(DescriptorStore::new(tmp.path()));

        let err = registry.load_all().expect_err("should abort");
        assert!(err.to_string().contains("shell"), "got: {err}");
        assert!(err.to_string().contains("docker.image"), "got: {err}");
    }

    #[test]
    fn dependencies_default_to_empty() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_module(tmp.path(), "db", "docker:\n  image: img\n");
        let mut registry = ModuleRegistry::new(DescriptorStore::new(tmp.path()));

        let deps = registry.dependencies("db").expect("should load");
        assert!(deps.is_empty());
    }

    #[test]
    fn dependencies_preserve_declaration_order() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_module(
            tmp.path(),
            "app",
            "dependencies: [db, cache]\ndocker:\n  image: img\n",
        );
        let mut registry = ModuleRegistry::new(DescriptorStore::new(tmp.path()));

        let deps = registry.dependencies("app").expect("should load");
        assert_eq!(deps, vec!["db", "cache"]);
    }

    #[test]
    fn get_without_load_returns_none() {
        let tmp = tempfile::tempdir().expect("tempdir");
        write_module(tmp.path(), "db", "docker:\n  image: img\n");
        let registry = ModuleRegistry::new(DescriptorStore::new(tmp.path()));
        assert!(registry.get("db").is_none());
    }
}
