//! Structural checks on logical names and cross-section references.

use stratus_ir::{Template, logical_name_problem};

use crate::{Result, error::SourceContext};

pub(crate) fn check_logical_name(
    ctx: &SourceContext,
    name: &str,
    section: &'static str,
) -> Result<()> {
    match logical_name_problem(name) {
        Some(reason) => Err(ctx.invalid_name(name, section, reason)),
        None => Ok(()),
    }
}

/// DependsOn entries must name declared resources and condition names must
/// be defined in the Conditions section.
pub(crate) fn check_links(ctx: &SourceContext, template: &Template) -> Result<()> {
    for (name, def) in &template.resources {
        for dep in &def.depends_on {
            if !template.resources.contains_key(dep) {
                return Err(ctx.invalid(
                    format!("resource '{}' depends on undeclared resource '{}'", name, dep),
                    Some(name),
                ));
            }
        }
        if let Some(condition) = &def.condition {
            check_condition(ctx, template, name, condition)?;
        }
    }
    for (name, output) in &template.outputs {
        if let Some(condition) = &output.condition {
            check_condition(ctx, template, name, condition)?;
        }
    }
    Ok(())
}

fn check_condition(
    ctx: &SourceContext,
    template: &Template,
    owner: &str,
    condition: &str,
) -> Result<()> {
    if template.conditions.contains_key(condition) {
        return Ok(());
    }
    Err(ctx.invalid(
        format!("'{}' uses undefined condition '{}'", owner, condition),
        Some(owner),
    ))
}
