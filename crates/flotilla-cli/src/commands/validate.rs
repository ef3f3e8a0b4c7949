//! `flotilla validate` — Check modules and resolution without writing output.

use std::path::Path;

use clap::Args;
use flotilla_compose::registry::ModuleRegistry;
use flotilla_compose::resolver;
use flotilla_compose::store::DescriptorStore;

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Module names to validate.
    pub modules: Vec<String>,

    /// Validate every module found under the modules directory.
    #[arg(long, conflicts_with = "modules")]
    pub all: bool,
}

/// Executes the `validate` command.
///
/// Loads each requested module, reporting success or failure per module,
/// then resolves the dependency order. No manifest is written.
///
/// # Errors
///
/// Returns an error if any module fails to load or resolution fails.
pub fn execute(modules_dir: &Path, args: ValidateArgs) -> anyhow::Result<()> {
    let store = DescriptorStore::new(modules_dir);
    let mut registry = ModuleRegistry::new(store);

    let requested = if args.all {
        registry.available()?
    } else if args.modules.is_empty() {
        anyhow::bail!("no modules requested: pass module names or --all");
    } else {
        args.modules
    };

    let mut failures = 0_usize;
    for name in &requested {
        match registry.load(name) {
            Ok(descriptor) if descriptor.docker.image.is_none() => {
                println!("  ! {name}: missing docker.image");
                failures += 1;
            }
            Ok(_) => println!("  + {name}"),
            Err(e) => {
                println!("  ! {name}: {e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!(
            "{failures} of {} module(s) failed validation",
            requested.len()
        );
    }

    let order = resolver::resolve(&mut registry, &requested)?;
    println!();
    println!("Resolution order: {}", order.join(", "));
    println!("{} module(s) validated.", order.len());

    Ok(())
}
