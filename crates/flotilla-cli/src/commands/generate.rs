//! `flotilla generate` — Assemble and write the deployment manifest.

use std::path::{Path, PathBuf};

use clap::Args;
use flotilla_common::config::GeneratorConfig;
use flotilla_compose::registry::ModuleRegistry;
use flotilla_compose::store::DescriptorStore;
use flotilla_compose::{manifest, resolver};

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Module names to include.
    pub modules: Vec<String>,

    /// Include every module found under the modules directory.
    #[arg(long, conflicts_with = "modules")]
    pub all: bool,

    /// Write the manifest to this path.
    #[arg(short, long, default_value = flotilla_common::constants::DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,
}

/// Executes the `generate` command.
///
/// # Errors
///
/// Returns an error if loading, resolution, assembly, or the final write
/// fails; a failed run never leaves a partial manifest on disk.
pub fn execute(modules_dir: &Path, args: GenerateArgs) -> anyhow::Result<()> {
    let config = GeneratorConfig {
        modules_dir: modules_dir.to_path_buf(),
        output_file: args.output,
    };
    tracing::info!(
        modules_dir = %config.modules_dir.display(),
        output = %config.output_file.display(),
        "generating manifest"
    );

    let store = DescriptorStore::new(&config.modules_dir);
    let mut registry = ModuleRegistry::new(store);

    let requested = if args.all {
        registry.load_all()?
    } else if args.modules.is_empty() {
        anyhow::bail!("no modules requested: pass module names or --all");
    } else {
        args.modules
    };

    let order = resolver::resolve(&mut registry, &requested)?;
    let built = manifest::assemble(&mut registry, &order)?;
    built.write(&config.output_file)?;

    println!("Generated: {}", config.output_file.display());
    println!("  Services: {}", built.services.len());
    println!("  Networks: {}", built.networks.len());
    println!("  Volumes:  {}", built.volumes.len());

    Ok(())
}
