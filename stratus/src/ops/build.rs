//! Build operation - template from a declaration graph.

use std::path::Path;

use eyre::{Context, Result};
use stratus_build::{DeclarationProvider, JsonFileProvider, TemplateBuilder};
use stratus_template::Format;

use crate::{commands::UnwrapOrExit, reports::BuildReport};

/// Options for the build operation.
pub struct BuildOptions<'a> {
    /// Declaration graph file.
    pub graph: &'a Path,
    /// Template destination; stdout when `None`.
    pub output: Option<&'a Path>,
    pub format: Format,
    /// Stop after ordering the resources.
    pub order_only: bool,
}

/// Execute the build operation.
pub fn build(opts: BuildOptions) -> Result<BuildReport> {
    let declarations = JsonFileProvider::new(opts.graph)
        .declarations()
        .unwrap_or_exit();
    let builder = TemplateBuilder::new(&declarations);

    if opts.order_only {
        return Ok(BuildReport::Order(builder.order().unwrap_or_exit()));
    }

    let template = builder.build().unwrap_or_exit();
    let text = stratus_template::emit(&template, opts.format).unwrap_or_exit();

    let Some(output) = opts.output else {
        return Ok(BuildReport::Printed(text));
    };
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create '{}'", parent.display()))?;
    }
    std::fs::write(output, &text)
        .wrap_err_with(|| format!("failed to write '{}'", output.display()))?;

    Ok(BuildReport::Written {
        path: output.to_path_buf(),
        format: opts.format,
        resources: template.resources.len(),
        serverless: template.has_serverless_transform(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = r#"{
        "resources": [
            { "name": "ProcessorFunction", "type": "lambda.Function", "dependencies": ["DataBucket"] },
            { "name": "DataBucket", "type": "s3.Bucket" }
        ],
        "values": {
            "DataBucket": { "BucketName": "data" },
            "ProcessorFunction": { "Runtime": "python3.12" }
        }
    }"#;

    #[test]
    fn test_order_only() {
        let temp = tempfile::TempDir::new().unwrap();
        let graph = temp.path().join("graph.json");
        std::fs::write(&graph, GRAPH).unwrap();

        let report = build(BuildOptions {
            graph: &graph,
            output: None,
            format: Format::Json,
            order_only: true,
        })
        .unwrap();

        match report {
            BuildReport::Order(order) => assert_eq!(order, ["DataBucket", "ProcessorFunction"]),
            other => panic!("unexpected report: {:?}", other),
        }
    }

    #[test]
    fn test_writes_yaml_template() {
        let temp = tempfile::TempDir::new().unwrap();
        let graph = temp.path().join("graph.json");
        std::fs::write(&graph, GRAPH).unwrap();
        let output = temp.path().join("out/template.yaml");

        let report = build(BuildOptions {
            graph: &graph,
            output: Some(&output),
            format: Format::Yaml,
            order_only: false,
        })
        .unwrap();

        assert!(matches!(report, BuildReport::Written { resources: 2, serverless: false, .. }));
        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("AWS::Lambda::Function"));
        let parsed = stratus_template::parse_str(&text).unwrap();
        assert_eq!(parsed.format, Format::Yaml);
    }
}
