//! System-wide constants and default paths.

/// File name of a module's descriptor inside its directory.
pub const MODULE_FILE_NAME: &str = "module.yml";

/// Default directory scanned for module descriptors.
pub const DEFAULT_MODULES_DIR: &str = "modules";

/// Default output path for the assembled manifest.
pub const DEFAULT_OUTPUT_FILE: &str = "docker-compose.yml";

/// Name of the implicit shared network every deployment joins.
pub const SHARED_NETWORK: &str = "flotilla_net";

/// Label namespace prefix applied to generated resources.
pub const LABEL_PREFIX: &str = "com.flotilla";

/// Application name used in CLI output.
pub const APP_NAME: &str = "flotilla";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "flotilla";
