use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use stratus_template::Format;

use crate::{
    config::Config,
    ops::{self, BuildOptions},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct BuildCommand {
    /// Declaration graph file (JSON)
    pub graph: PathBuf,

    /// Write the template here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Template format: json or yaml
    #[arg(short, long)]
    pub format: Option<Format>,

    /// Print the resource order without building
    #[arg(long)]
    pub order: bool,
}

impl BuildCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let report = ops::build(BuildOptions {
            graph: &self.graph,
            output: self.output.as_deref().or(config.build.output.as_deref()),
            format: self.format.or(config.build.format).unwrap_or_default(),
            order_only: self.order,
        })?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
