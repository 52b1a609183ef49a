mod build;
mod check;
mod completions;
mod import;

use std::path::PathBuf;

use build::BuildCommand;
use check::CheckCommand;
use clap::{Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use import::ImportCommand;

use crate::config::Config;

/// Extension trait for exiting on diagnostic errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T, E> UnwrapOrExit<T> for std::result::Result<T, Box<E>>
where
    E: miette::Diagnostic + Send + Sync + 'static,
{
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "stratus")]
#[command(version)]
#[command(about = "Compile declaration graphs to CloudFormation templates and back")]
pub(crate) struct Cli {
    /// Path to stratus.toml (defaults to ./stratus.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        match &self.command {
            Commands::Build(cmd) => cmd.run(&config),
            Commands::Import(cmd) => cmd.run(&config),
            Commands::Check(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a template from a declaration graph
    Build(BuildCommand),

    /// Generate Rust declarations from a template
    Import(ImportCommand),

    /// Parse a template and report undefined references
    Check(CheckCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
