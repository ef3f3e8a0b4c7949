//! CLI command definitions and dispatch.

pub mod generate;
pub mod list;
pub mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Flotilla — compiles module descriptors into deployment manifests.
#[derive(Parser, Debug)]
#[command(name = "flotilla", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Directory containing module descriptors (one subdirectory per module).
    #[arg(
        long,
        global = true,
        env = "FLOTILLA_MODULES_DIR",
        default_value = flotilla_common::constants::DEFAULT_MODULES_DIR
    )]
    pub modules_dir: PathBuf,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble and write the deployment manifest.
    Generate(generate::GenerateArgs),
    /// Load and resolve modules without writing a manifest.
    Validate(validate::ValidateArgs),
    /// List available modules under the modules directory.
    List(list::ListArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        modules_dir,
    } = cli;
    match command {
        Command::Generate(args) => generate::execute(&modules_dir, args),
        Command::Validate(args) => validate::execute(&modules_dir, args),
        Command::List(args) => list::execute(&modules_dir, args),
    }
}
