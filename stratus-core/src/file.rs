use std::path::{Path, PathBuf};

use eyre::Result;

/// Header placed on every generated source file.
pub const GENERATED_HEADER: &str = "// Code generated by stratus import. DO NOT EDIT.\n";

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File was left alone (already exists)
    Skipped,
}

/// How to handle existing files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    /// Always overwrite
    #[default]
    Always,
    /// Only create if the file doesn't exist
    IfMissing,
}

/// A file to be written below an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    path: PathBuf,
    content: String,
    overwrite: Overwrite,
}

impl File {
    /// Create a file with the given relative path and content.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            overwrite: Overwrite::Always,
        }
    }

    /// Create a generated source file, prefixed with [`GENERATED_HEADER`].
    pub fn generated(path: impl Into<PathBuf>, body: impl AsRef<str>) -> Self {
        Self::new(path, format!("{}\n{}", GENERATED_HEADER, body.as_ref()))
    }

    pub fn with_overwrite(mut self, overwrite: Overwrite) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Path relative to the output directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Write below `base` according to the overwrite rule.
    pub fn write(&self, base: &Path) -> Result<WriteResult> {
        let target = base.join(&self.path);
        if self.overwrite == Overwrite::IfMissing && target.exists() {
            return Ok(WriteResult::Skipped);
        }
        write_file(&target, &self.content)?;
        Ok(WriteResult::Written)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let file = File::new("a/b/network.rs", "nested");

        assert_eq!(file.write(temp.path()).unwrap(), WriteResult::Written);
        assert_eq!(
            fs::read_to_string(temp.path().join("a/b/network.rs")).unwrap(),
            "nested"
        );
    }

    #[test]
    fn test_write_always_overwrites() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("mod.rs"), "original").unwrap();

        let result = File::new("mod.rs", "updated").write(temp.path()).unwrap();

        assert_eq!(result, WriteResult::Written);
        assert_eq!(
            fs::read_to_string(temp.path().join("mod.rs")).unwrap(),
            "updated"
        );
    }

    #[test]
    fn test_write_if_missing_skips_existing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("mod.rs"), "original").unwrap();

        let result = File::new("mod.rs", "should not write")
            .with_overwrite(Overwrite::IfMissing)
            .write(temp.path())
            .unwrap();

        assert_eq!(result, WriteResult::Skipped);
        assert_eq!(
            fs::read_to_string(temp.path().join("mod.rs")).unwrap(),
            "original"
        );
    }

    #[test]
    fn test_generated_header() {
        let file = File::generated("storage.rs", "pub static X: u8 = 0;\n");
        assert!(file.content().starts_with(GENERATED_HEADER));
        assert!(file.content().ends_with("pub static X: u8 = 0;\n"));
    }
}
