//! Check operation - parse a template and collect reference warnings.

use std::path::Path;

use crate::{commands::UnwrapOrExit, reports::CheckReport};

/// Execute the check operation.
pub fn check(template: &Path) -> CheckReport {
    let parsed = stratus_template::parse_file(template).unwrap_or_exit();
    let doc = &parsed.template;

    CheckReport {
        template: template.display().to_string(),
        format: parsed.format,
        resources: doc.resources.len(),
        parameters: doc.parameters.len(),
        outputs: doc.outputs.len(),
        implicit: parsed.implicit_resources.iter().cloned().collect(),
        warnings: parsed.warnings.iter().map(ToString::to_string).collect(),
    }
}
