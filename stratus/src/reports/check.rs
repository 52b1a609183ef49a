//! Check command report data structures.

use stratus_template::Format;

use super::output::{Output, Report};

/// Report data from checking a template.
#[derive(Debug)]
pub struct CheckReport {
    pub template: String,
    pub format: Format,
    pub resources: usize,
    pub parameters: usize,
    pub outputs: usize,
    /// Resources the platform synthesizes from serverless declarations.
    pub implicit: Vec<String>,
    pub warnings: Vec<String>,
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        out.key_value("Template", &format!("{} ({})", self.template, self.format));
        out.key_value("Resources", &self.resources.to_string());
        out.key_value("Parameters", &self.parameters.to_string());
        out.key_value("Outputs", &self.outputs.to_string());

        if !self.implicit.is_empty() {
            out.newline();
            out.section("Implicit resources");
            for name in &self.implicit {
                out.list_item(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::BufferOutput;

    #[test]
    fn test_renders_counts_and_implicit() {
        let report = CheckReport {
            template: "template.yaml".into(),
            format: Format::Yaml,
            resources: 1,
            parameters: 0,
            outputs: 1,
            implicit: vec!["ServerlessRestApi".into()],
            warnings: vec!["undefined reference 'Missing' in Outputs.Url".into()],
        };
        let mut out = BufferOutput::default();
        report.render(&mut out);

        assert_eq!(
            out.lines,
            [
                "warning: undefined reference 'Missing' in Outputs.Url",
                "Template: template.yaml (yaml)",
                "Resources: 1",
                "Parameters: 0",
                "Outputs: 1",
                "",
                "Implicit resources:",
                "- ServerlessRestApi",
            ]
        );
    }
}
