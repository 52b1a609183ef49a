use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use stratus_codegen::DEFAULT_PACKAGE;

use crate::{
    config::Config,
    ops::{self, ImportOptions},
    reports::{Report, TerminalOutput},
};

/// Output directory when neither the flag nor stratus.toml sets one.
const DEFAULT_OUTPUT: &str = "src/stack";

#[derive(Args)]
pub struct ImportCommand {
    /// Template file (JSON or YAML)
    pub template: PathBuf,

    /// Directory for the generated module
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Resource specification JSON used for property shapes
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Crate path of the resource library the generated code uses
    #[arg(long)]
    pub package: Option<String>,

    /// Preview generated code without writing to disk
    #[arg(long)]
    pub dry_run: bool,

    /// Overwrite an existing generated module
    #[arg(long)]
    pub force: bool,
}

impl ImportCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let output = self
            .output
            .clone()
            .or_else(|| config.import.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
        let package = self
            .package
            .as_deref()
            .or(config.import.package.as_deref())
            .unwrap_or(DEFAULT_PACKAGE);

        let report = ops::import(ImportOptions {
            template: &self.template,
            output_dir: &output,
            schema: self.schema.as_deref().or(config.import.schema.as_deref()),
            package,
            dry_run: self.dry_run,
            force: self.force,
        })?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
