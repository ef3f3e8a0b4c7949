//! Generator configuration model.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for one manifest generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Directory scanned for module descriptors.
    pub modules_dir: PathBuf,
    /// Path the assembled manifest is written to.
    pub output_file: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            modules_dir: PathBuf::from(crate::constants::DEFAULT_MODULES_DIR),
            output_file: PathBuf::from(crate::constants::DEFAULT_OUTPUT_FILE),
        }
    }
}
