use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Template file (JSON or YAML)
    pub template: PathBuf,

    /// Exit with an error when references are undefined
    #[arg(long)]
    pub strict: bool,
}

impl CheckCommand {
    pub fn run(&self) -> Result<()> {
        let report = ops::check(&self.template);
        report.render(&mut TerminalOutput::new());

        if self.strict && !report.warnings.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }
}
