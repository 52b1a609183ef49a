//! Import operation - Rust declarations from a template.

use std::path::Path;

use eyre::{Context, Result, bail};
use stratus_codegen::{RustGenerator, SpecSchema};

use crate::{
    commands::UnwrapOrExit,
    reports::{GenerationResult, ImportReport, PreviewFile},
};

/// Options for the import operation.
pub struct ImportOptions<'a> {
    pub template: &'a Path,
    /// Directory for the generated module.
    pub output_dir: &'a Path,
    /// Resource specification; shapes are inferred from values without one.
    pub schema: Option<&'a Path>,
    /// Crate path of the resource library.
    pub package: &'a str,
    /// Whether to preview without writing files.
    pub dry_run: bool,
    /// Whether to replace an existing generated module.
    pub force: bool,
}

/// Execute the import operation.
pub fn import(opts: ImportOptions) -> Result<ImportReport> {
    let parsed = stratus_template::parse_file(opts.template).unwrap_or_exit();
    let spec = opts
        .schema
        .map(|path| SpecSchema::from_file(path).unwrap_or_exit());

    let mut generator = RustGenerator::new(&parsed.template).with_package(opts.package);
    if let Some(spec) = &spec {
        generator = generator.with_schema(spec);
    }
    let rendered = generator.render().unwrap_or_exit();

    let result = if opts.dry_run {
        GenerationResult::Preview(
            rendered
                .files
                .iter()
                .map(|f| PreviewFile {
                    path: f.path().display().to_string(),
                    content: f.content().to_string(),
                })
                .collect(),
        )
    } else {
        if opts.output_dir.join("mod.rs").exists() && !opts.force {
            bail!(
                "'{}' already contains a generated module, pass --force to overwrite it",
                opts.output_dir.display()
            );
        }
        let mut written = Vec::with_capacity(rendered.files.len());
        for file in &rendered.files {
            file.write(opts.output_dir)
                .wrap_err_with(|| format!("failed to write '{}'", file.path().display()))?;
            written.push(file.path().display().to_string());
        }
        GenerationResult::Written {
            output_dir: opts.output_dir.to_path_buf(),
            files: written,
        }
    };

    Ok(ImportReport {
        template: opts.template.display().to_string(),
        resources: parsed.template.resources.len(),
        warnings: parsed.warnings.iter().map(ToString::to_string).collect(),
        skipped: rendered
            .report
            .skipped()
            .map(|(name, reason)| format!("{}: {}", name, reason))
            .collect(),
        broken_cycles: rendered
            .broken_cycles
            .iter()
            .map(|edge| format!("{} -> {}", edge.from, edge.to))
            .collect(),
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"
Resources:
  DataBucket:
    Type: AWS::S3::Bucket
  Seeder:
    Type: Custom::Seeder
    Properties:
      Bucket: !Ref DataBucket
"#;

    fn options<'a>(template: &'a Path, output_dir: &'a Path) -> ImportOptions<'a> {
        ImportOptions {
            template,
            output_dir,
            schema: None,
            package: "acme_cfn",
            dry_run: false,
            force: false,
        }
    }

    #[test]
    fn test_import_writes_module() {
        let temp = tempfile::TempDir::new().unwrap();
        let template = temp.path().join("template.yaml");
        std::fs::write(&template, TEMPLATE).unwrap();
        let output = temp.path().join("stack");

        let report = import(options(&template, &output)).unwrap();

        assert_eq!(report.resources, 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(output.join("mod.rs").exists());
        assert!(output.join("storage.rs").exists());
        assert!(output.join("misc.rs").exists());
    }

    #[test]
    fn test_existing_module_needs_force() {
        let temp = tempfile::TempDir::new().unwrap();
        let template = temp.path().join("template.yaml");
        std::fs::write(&template, TEMPLATE).unwrap();
        let output = temp.path().join("stack");

        import(options(&template, &output)).unwrap();
        assert!(import(options(&template, &output)).is_err());

        let forced = ImportOptions {
            force: true,
            ..options(&template, &output)
        };
        assert!(import(forced).is_ok());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = tempfile::TempDir::new().unwrap();
        let template = temp.path().join("template.yaml");
        std::fs::write(&template, TEMPLATE).unwrap();
        let output = temp.path().join("stack");

        let report = import(ImportOptions {
            dry_run: true,
            ..options(&template, &output)
        })
        .unwrap();

        assert!(matches!(report.result, GenerationResult::Preview(ref files) if files.len() == 3));
        assert!(!output.exists());
    }
}
