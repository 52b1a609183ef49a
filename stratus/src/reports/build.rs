//! Build command report data structures.

use std::path::PathBuf;

use stratus_ir::SERVERLESS_TRANSFORM;
use stratus_template::Format;

use super::output::{Output, Report};

/// Report data from a build.
#[derive(Debug)]
pub enum BuildReport {
    /// Resource names in dependency order.
    Order(Vec<String>),
    /// Template text destined for stdout.
    Printed(String),
    /// Template written to a file.
    Written {
        path: PathBuf,
        format: Format,
        resources: usize,
        serverless: bool,
    },
}

impl Report for BuildReport {
    fn render(&self, out: &mut dyn Output) {
        match self {
            BuildReport::Order(order) => {
                for (i, name) in order.iter().enumerate() {
                    out.numbered_item(i + 1, name);
                }
            }
            BuildReport::Printed(text) => {
                out.document(text);
                if !text.ends_with('\n') {
                    out.newline();
                }
            }
            BuildReport::Written {
                path,
                format,
                resources,
                serverless,
            } => {
                out.key_value("Wrote", &format!("{} ({})", path.display(), format));
                out.key_value("Resources", &resources.to_string());
                if *serverless {
                    out.key_value("Transform", SERVERLESS_TRANSFORM);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::BufferOutput;

    #[test]
    fn test_order_is_numbered() {
        let mut out = BufferOutput::default();
        BuildReport::Order(vec!["DataBucket".into(), "ProcessorFunction".into()]).render(&mut out);
        assert_eq!(out.lines, ["1. DataBucket", "2. ProcessorFunction"]);
    }

    #[test]
    fn test_written_summary() {
        let mut out = BufferOutput::default();
        BuildReport::Written {
            path: PathBuf::from("template.yaml"),
            format: Format::Yaml,
            resources: 3,
            serverless: true,
        }
        .render(&mut out);
        assert_eq!(
            out.lines,
            [
                "Wrote: template.yaml (yaml)",
                "Resources: 3",
                "Transform: AWS::Serverless-2016-10-31",
            ]
        );
    }
}
