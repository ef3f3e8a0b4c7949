//! `flotilla list` — List available modules.

use std::path::Path;

use clap::Args;
use flotilla_compose::registry::ModuleRegistry;
use flotilla_compose::store::DescriptorStore;

/// Arguments for the `list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show each module's dependency list.
    #[arg(long)]
    pub deps: bool,
}

/// Executes the `list` command.
///
/// # Errors
///
/// Returns an error if the modules directory cannot be scanned or a
/// descriptor fails to load.
pub fn execute(modules_dir: &Path, args: ListArgs) -> anyhow::Result<()> {
    let store = DescriptorStore::new(modules_dir);
    let mut registry = ModuleRegistry::new(store);

    let names = registry.available()?;
    if names.is_empty() {
        println!("No modules found under {}", modules_dir.display());
        return Ok(());
    }

    for name in &names {
        let descriptor = registry.load(name)?;
        if descriptor.description.is_empty() {
            println!("{name}  {}", descriptor.version);
        } else {
            println!("{name}  {}  {}", descriptor.version, descriptor.description);
        }
        if args.deps && !descriptor.dependencies.is_empty() {
            println!("    depends on: {}", descriptor.dependencies.join(", "));
        }
    }

    Ok(())
}
