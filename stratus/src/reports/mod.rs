//! Command results.
//!
//! Operations return a report value; commands render it to an output target.

mod build;
mod check;
mod import;
mod output;

pub use build::BuildReport;
pub use check::CheckReport;
pub use import::{GenerationResult, ImportReport, PreviewFile};
pub use output::{Report, TerminalOutput};
