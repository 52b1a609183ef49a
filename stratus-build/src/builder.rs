//! Template assembly from a declaration graph.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Number;
use stratus_ir::{
    Export, FieldPath, Output, Parameter, ResourceDef, SERVERLESS_TRANSFORM, Template, Value,
    logical_name_problem,
};

use crate::{
    Declarations, DependencyGraph, DiscoveredOutput, Error, Result, Resolver, SourceLocation,
    repair_value, repair_value_at,
};

/// Builds a [`Template`] from declarations and their realized values.
///
/// Either a complete template or the first error is returned; nothing is
/// partially built.
#[derive(Debug)]
pub struct TemplateBuilder<'a> {
    decls: &'a Declarations,
}

impl<'a> TemplateBuilder<'a> {
    pub fn new(decls: &'a Declarations) -> Self {
        Self { decls }
    }

    /// Resource names, dependencies first.
    pub fn order(&self) -> Result<Vec<String>> {
        self.check_names()?;
        let mut graph = DependencyGraph::new();
        for resource in &self.decls.resources {
            graph.add_node(&resource.name, resource.location.clone());
        }
        for resource in &self.decls.resources {
            for dep in resource.dependencies.iter().chain(&resource.depends_on) {
                graph.add_edge(&resource.name, dep);
            }
        }
        Ok(graph.order()?)
    }

    pub fn build(&self) -> Result<Template> {
        let order = self.order()?;
        let resolver = Resolver::new(self.decls);
        let by_name: IndexMap<&str, _> = self
            .decls
            .resources
            .iter()
            .map(|r| (r.name.as_str(), r))
            .collect();

        let mut template = Template::new();
        template.description = self.decls.description.clone();

        for name in &order {
            let Some(resource) = by_name.get(name.as_str()) else {
                continue;
            };
            let resource_type = stratus_core::resolve(&resource.declared_type).ok_or_else(|| {
                Box::new(Error::UnknownType {
                    name: name.clone(),
                    declared_type: resource.declared_type.clone(),
                    location: resource.location.clone(),
                })
            })?;

            let mut properties = self.decls.values.get(name).cloned().unwrap_or_default();
            let usages = resolver.resolve(name);
            repair_value(name, &mut properties, &usages)?;
            tracing::debug!(resource = %name, %resource_type, "built resource");

            template.resources.insert(
                name.clone(),
                ResourceDef {
                    resource_type,
                    properties,
                    depends_on: resource.depends_on.clone(),
                    condition: resource.condition.clone(),
                    deletion_policy: resource.deletion_policy.clone(),
                    update_replace_policy: resource.update_replace_policy.clone(),
                    metadata: resource.metadata.clone(),
                },
            );
        }

        for param in &self.decls.parameters {
            let value = self.decls.values.get(&param.name).cloned().unwrap_or_default();
            template
                .parameters
                .insert(param.name.clone(), parameter_from_value(&param.name, &value)?);
        }
        for mapping in &self.decls.mappings {
            let value = self.decls.values.get(&mapping.name).cloned().unwrap_or_default();
            template.mappings.insert(mapping.name.clone(), value);
        }
        for condition in &self.decls.conditions {
            let value = self.decls.values.get(&condition.name).cloned().unwrap_or_default();
            template.conditions.insert(condition.name.clone(), value);
        }
        for output in &self.decls.outputs {
            template
                .outputs
                .insert(output.name.clone(), self.build_output(output, &resolver)?);
        }

        if template
            .resources
            .values()
            .any(|r| stratus_core::is_serverless(&r.resource_type))
        {
            template.transform = Some(Value::from(SERVERLESS_TRANSFORM));
        }

        tracing::info!(
            resources = template.resources.len(),
            parameters = template.parameters.len(),
            outputs = template.outputs.len(),
            "template built"
        );
        Ok(template)
    }

    /// Every logical name is valid and used once across all sections.
    ///
    /// Values and attribute usages are keyed by name alone, so a name shared
    /// between sections would mix two declarations.
    fn check_names(&self) -> Result<()> {
        let decls = self.decls;
        let names = decls
            .resources
            .iter()
            .map(|r| ("Resources", &r.name, &r.location))
            .chain(decls.parameters.iter().map(|p| ("Parameters", &p.name, &p.location)))
            .chain(decls.mappings.iter().map(|m| ("Mappings", &m.name, &m.location)))
            .chain(decls.conditions.iter().map(|c| ("Conditions", &c.name, &c.location)))
            .chain(decls.outputs.iter().map(|o| ("Outputs", &o.name, &o.location)));

        let mut seen: HashMap<&str, &'static str> = HashMap::new();
        for (section, name, location) in names {
            if let Some(reason) = logical_name_problem(name) {
                return Err(Box::new(Error::InvalidName {
                    name: name.clone(),
                    section,
                    reason,
                    location: location.clone(),
                }));
            }
            if let Some(first) = seen.insert(name.as_str(), section) {
                return Err(duplicate(name, first, section, location));
            }
        }
        Ok(())
    }

    fn build_output(&self, output: &DiscoveredOutput, resolver: &Resolver<'_>) -> Result<Output> {
        let mut value = output.value.clone();
        let usages = resolver.resolve(&output.name);
        repair_value_at(&output.name, &mut value, &FieldPath::parse("Value"), &usages)?;

        let export = match (&output.export_name, &output.export) {
            (Some(name), _) => Some(Export { name: name.clone() }),
            (None, Some(Value::Object(map))) => match map.get("Name") {
                Some(name) => Some(Export { name: name.clone() }),
                None => {
                    return Err(Error::serialization(
                        &output.name,
                        "export object has no 'Name' field",
                    ));
                }
            },
            (None, Some(Value::Null)) | (None, None) => None,
            (None, Some(other)) => Some(Export {
                name: other.clone(),
            }),
        };

        Ok(Output {
            description: output.description.clone(),
            value,
            export,
            condition: output.condition.clone(),
        })
    }
}

fn duplicate(
    name: &str,
    first: &'static str,
    second: &'static str,
    location: &Option<SourceLocation>,
) -> Box<Error> {
    Box::new(Error::DuplicateName {
        name: name.to_string(),
        first,
        second,
        location: location.clone(),
    })
}

/// Map a parameter's realized value onto [`Parameter`] field by field.
fn parameter_from_value(name: &str, value: &Value) -> Result<Parameter> {
    let Some(fields) = value.as_object() else {
        return Err(Error::serialization(name, "parameter value is not an object"));
    };
    let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);

    let mut param = Parameter::new(text("Type").unwrap_or_else(|| "String".to_string()));
    param.description = text("Description");
    param.default = fields.get("Default").filter(|v| !v.is_null()).cloned();
    param.allowed_values = fields
        .get("AllowedValues")
        .and_then(Value::as_array)
        .map(<[Value]>::to_vec)
        .unwrap_or_default();
    param.allowed_pattern = text("AllowedPattern");
    param.constraint_description = text("ConstraintDescription");
    param.min_length = length(name, "MinLength", fields.get("MinLength"))?;
    param.max_length = length(name, "MaxLength", fields.get("MaxLength"))?;
    param.min_value = bound(name, "MinValue", fields.get("MinValue"))?;
    param.max_value = bound(name, "MaxValue", fields.get("MaxValue"))?;
    param.no_echo = fields
        .get("NoEcho")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Ok(param)
}

fn length(name: &str, field: &str, value: Option<&Value>) -> Result<Option<u32>> {
    let Some(n) = number(value) else {
        return Ok(None);
    };
    if n.fract() != 0.0 || n < 0.0 || n > f64::from(u32::MAX) {
        return Err(Error::serialization(
            name,
            format!("{} must be a non-negative integer, got {}", field, n),
        ));
    }
    Ok(Some(n as u32))
}

fn bound(name: &str, field: &str, value: Option<&Value>) -> Result<Option<Number>> {
    let Some(n) = number(value) else {
        return Ok(None);
    };
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return Ok(Some(Number::from(n as i64)));
    }
    Number::from_f64(n)
        .map(Some)
        .ok_or_else(|| Error::serialization(name, format!("{} is not a finite number", field)))
}

fn number(value: Option<&Value>) -> Option<f64> {
    value.filter(|v| !v.is_null()).and_then(Value::as_f64)
}
