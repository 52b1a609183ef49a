//! Language-agnostic code generation traits.

use std::path::{Path, PathBuf};

use eyre::Result;

use crate::{File, WriteResult};

/// Trait for generators that turn a parsed template into source files.
///
/// Implement this trait to emit declarations in a new host language.
pub trait LanguageCodegen {
    /// Language identifier (e.g., "rust")
    fn language(&self) -> &'static str;

    /// File extension for generated source files (e.g., "rs")
    fn file_extension(&self) -> &'static str;

    /// Render every file without touching the disk
    fn files(&self) -> Result<Vec<File>>;

    /// Render and write all files into `output_dir`
    fn generate(&self, output_dir: &Path) -> Result<GenerateResult> {
        let mut result = GenerateResult::default();
        for file in self.files()? {
            match file.write(output_dir)? {
                WriteResult::Written => result.written.push(file.path().to_path_buf()),
                WriteResult::Skipped => result.skipped.push(file.path().to_path_buf()),
            }
        }
        Ok(result)
    }
}

/// Result of code generation
#[derive(Debug, Default)]
pub struct GenerateResult {
    /// Files written, relative to the output directory
    pub written: Vec<PathBuf>,
    /// Files left untouched because they already existed
    pub skipped: Vec<PathBuf>,
}
