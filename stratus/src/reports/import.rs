//! Import command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from importing a template.
#[derive(Debug)]
pub struct ImportReport {
    pub template: String,
    pub resources: usize,
    /// References the template makes to undeclared names.
    pub warnings: Vec<String>,
    /// Resources emitted as raw placeholders, with the reason.
    pub skipped: Vec<String>,
    /// Dependency edges demoted to plain references.
    pub broken_cycles: Vec<String>,
    pub result: GenerationResult,
}

/// Result of the generation step.
#[derive(Debug)]
pub enum GenerationResult {
    /// Dry run - files were not written.
    Preview(Vec<PreviewFile>),
    /// Files were written to disk.
    Written {
        output_dir: PathBuf,
        files: Vec<String>,
    },
}

/// A file in dry-run preview.
#[derive(Debug)]
pub struct PreviewFile {
    pub path: String,
    pub content: String,
}

impl Report for ImportReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }
        for skipped in &self.skipped {
            out.warning(&format!("unsupported resource {}", skipped));
        }

        if !self.broken_cycles.is_empty() {
            out.section("Broken cycles");
            for edge in &self.broken_cycles {
                out.list_item(edge);
            }
            out.newline();
        }

        match &self.result {
            GenerationResult::Preview(files) => {
                for file in files {
                    out.divider(&file.path);
                    out.preformatted(&file.content);
                }
                out.newline();
                out.key_value(
                    "Dry run",
                    &format!(
                        "{} file(s) from {} resource(s) in {}",
                        files.len(),
                        self.resources,
                        self.template
                    ),
                );
            }
            GenerationResult::Written { output_dir, files } => {
                out.section(&format!("Generated {}", output_dir.display()));
                for file in files {
                    out.added_item(file);
                }
                out.newline();
                out.key_value("Resources", &self.resources.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::BufferOutput;

    fn report(result: GenerationResult) -> ImportReport {
        ImportReport {
            template: "template.yaml".into(),
            resources: 2,
            warnings: vec![],
            skipped: vec!["Seeder: no declaration for Custom::Seeder".into()],
            broken_cycles: vec!["Queue -> Topic".into()],
            result,
        }
    }

    #[test]
    fn test_written_lists_files() {
        let mut out = BufferOutput::default();
        report(GenerationResult::Written {
            output_dir: PathBuf::from("src/stack"),
            files: vec!["mod.rs".into(), "storage.rs".into()],
        })
        .render(&mut out);

        assert_eq!(
            out.lines,
            [
                "warning: unsupported resource Seeder: no declaration for Custom::Seeder",
                "Broken cycles:",
                "- Queue -> Topic",
                "",
                "Generated src/stack:",
                "+ mod.rs",
                "+ storage.rs",
                "",
                "Resources: 2",
            ]
        );
    }

    #[test]
    fn test_preview_shows_contents() {
        let mut out = BufferOutput::default();
        report(GenerationResult::Preview(vec![PreviewFile {
            path: "mod.rs".into(),
            content: "mod storage;".into(),
        }]))
        .render(&mut out);

        assert!(out.lines.contains(&"-- mod.rs --".to_string()));
        assert!(out.lines.contains(&"mod storage;".to_string()));
        assert_eq!(
            out.lines.last().unwrap(),
            "Dry run: 1 file(s) from 2 resource(s) in template.yaml"
        );
    }
}
