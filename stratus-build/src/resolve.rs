//! Attribute-reference resolution.
//!
//! Generic value serialization loses the owner of an attribute access and
//! leaves `{"Fn::GetAtt": ["", "Attr"]}` behind. The declaration graph
//! records where each access was written; this module collects those
//! records for a declaration and uses them to fill the blanks back in.

use std::collections::HashSet;

use indexmap::IndexMap;
use stratus_ir::{FieldPath, Intrinsic, Value, Walk};

use crate::{AttrRefUsage, Declarations, Error, Result, VarAttrRefInfo};

/// Where a resolved usage was found relative to the declaration resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    /// Recorded on the declaration itself.
    Own,
    /// Reached through a forwarded field.
    Forwarded,
    /// Recorded on a declaration this one depends on.
    Transitive,
}

/// An attribute usage with its path parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUsage {
    pub path: FieldPath,
    pub resource: String,
    pub attribute: String,
    pub origin: Origin,
}

/// Looks up attribute usages across a declaration graph.
#[derive(Debug)]
pub struct Resolver<'a> {
    usages: IndexMap<&'a str, Vec<&'a AttrRefUsage>>,
    dependencies: IndexMap<&'a str, Vec<&'a str>>,
    vars: &'a IndexMap<String, VarAttrRefInfo>,
}

impl<'a> Resolver<'a> {
    pub fn new(decls: &'a Declarations) -> Self {
        let mut usages: IndexMap<&str, Vec<&AttrRefUsage>> = IndexMap::new();
        let mut dependencies: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for resource in &decls.resources {
            usages
                .entry(resource.name.as_str())
                .or_default()
                .extend(resource.attr_refs.iter());
            dependencies
                .entry(resource.name.as_str())
                .or_default()
                .extend(resource.dependencies.iter().map(String::as_str));
        }
        for output in &decls.outputs {
            usages
                .entry(output.name.as_str())
                .or_default()
                .extend(output.attr_refs.iter());
        }
        for (name, info) in &decls.vars {
            usages
                .entry(name.as_str())
                .or_default()
                .extend(info.attr_refs.iter());
        }
        Self {
            usages,
            dependencies,
            vars: &decls.vars,
        }
    }

    /// Every usage reachable from `name`, own usages first.
    ///
    /// Cycles are tolerated: a declaration already visited contributes
    /// nothing the second time.
    pub fn resolve(&self, name: &str) -> Vec<ResolvedUsage> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        self.collect(name, &FieldPath::root(), Origin::Own, &mut visited, &mut out);

        let mut seen = HashSet::new();
        out.retain(|u: &ResolvedUsage| {
            seen.insert((u.path.clone(), u.resource.clone(), u.attribute.clone()))
        });
        out.sort_by_key(|u| u.origin);
        out
    }

    fn collect(
        &self,
        name: &str,
        prefix: &FieldPath,
        origin: Origin,
        visited: &mut HashSet<String>,
        out: &mut Vec<ResolvedUsage>,
    ) {
        if !visited.insert(name.to_string()) {
            return;
        }

        for usage in self.usages.get(name).into_iter().flatten() {
            out.push(ResolvedUsage {
                path: prefix.join(&usage.path()),
                resource: usage.resource.clone(),
                attribute: usage.attribute.clone(),
                origin,
            });
        }

        if let Some(info) = self.vars.get(name) {
            for (field, target) in &info.var_refs {
                let next_origin = if origin == Origin::Own {
                    Origin::Forwarded
                } else {
                    origin
                };
                let path = prefix.join(&FieldPath::parse(field));
                self.collect(target, &path, next_origin, visited, out);
            }
        }

        for dep in self.dependencies.get(name).into_iter().flatten() {
            self.collect(dep, &FieldPath::root(), Origin::Transitive, visited, out);
        }
    }
}

/// Match an unresolved reference at `path` against recorded usages.
///
/// Tiers, most specific first: exact path, path with array positions
/// removed, then trailing-segment suffix. Within a tier the first usage in
/// `usages` order wins, so a declaration's own records beat transitive ones.
pub fn find_usage<'u>(
    usages: &'u [ResolvedUsage],
    path: &FieldPath,
    attribute: &str,
) -> Option<&'u ResolvedUsage> {
    let candidates = || {
        usages
            .iter()
            .filter(move |u| attribute.is_empty() || u.attribute == attribute)
    };
    let stripped = path.strip_indices();

    candidates()
        .find(|u| &u.path == path)
        .or_else(|| candidates().find(|u| u.path.strip_indices() == stripped))
        .or_else(|| candidates().find(|u| stripped.ends_with(&u.path.strip_indices())))
}

/// Fill in every unresolved attribute reference inside `value`.
///
/// Fully formed `Ref`, `Fn::GetAtt` and `Fn::Sub` nodes are left as they
/// are. `name` is only used for the error.
pub fn repair_value(name: &str, value: &mut Value, usages: &[ResolvedUsage]) -> Result<()> {
    repair_value_at(name, value, &FieldPath::root(), usages)
}

/// [`repair_value`] for a value that sits at `base` inside its declaration,
/// such as an output's `Value` field.
pub fn repair_value_at(
    name: &str,
    value: &mut Value,
    base: &FieldPath,
    usages: &[ResolvedUsage],
) -> Result<()> {
    value.walk_mut(base, &mut |path, node| {
        let Value::Intrinsic(intrinsic) = node else {
            return Ok(Walk::Continue);
        };
        match intrinsic.as_mut() {
            Intrinsic::GetAtt(attr) if attr.is_unresolved() => {
                let Some(usage) = find_usage(usages, path, &attr.attribute) else {
                    return Err(Box::new(Error::UnresolvedReference {
                        name: name.to_string(),
                        path: path.to_string(),
                        attribute: attr.attribute.clone(),
                    }));
                };
                tracing::debug!(
                    declaration = name,
                    path = %path,
                    resource = %usage.resource,
                    attribute = %usage.attribute,
                    "resolved attribute reference"
                );
                attr.resource = usage.resource.clone();
                attr.attribute = usage.attribute.clone();
                Ok(Walk::Skip)
            }
            Intrinsic::Ref(_) | Intrinsic::GetAtt(_) | Intrinsic::Sub { .. } => Ok(Walk::Skip),
            _ => Ok(Walk::Continue),
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stratus_ir::AttrRef;

    use super::*;
    use crate::{DiscoveredOutput, DiscoveredResource};

    fn usage(resource: &str, attribute: &str, path: &str) -> AttrRefUsage {
        AttrRefUsage::new(resource, attribute, path)
    }

    #[test]
    fn test_resolution_follows_forwarding() {
        let mut decls = Declarations::default();
        decls.outputs.push(DiscoveredOutput {
            name: "Output".into(),
            ..Default::default()
        });
        decls.vars.insert(
            "Output".into(),
            VarAttrRefInfo {
                attr_refs: vec![],
                var_refs: IndexMap::from([("Value".to_string(), "Helper".to_string())]),
            },
        );
        decls.vars.insert(
            "Helper".into(),
            VarAttrRefInfo {
                attr_refs: vec![usage("Bucket", "Arn", "")],
                var_refs: IndexMap::new(),
            },
        );

        let resolved = Resolver::new(&decls).resolve("Output");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].resource, "Bucket");
        assert_eq!(resolved[0].attribute, "Arn");
        assert_eq!(resolved[0].path.to_string(), "Value");
        assert_eq!(resolved[0].origin, Origin::Forwarded);
    }

    #[test]
    fn test_resolution_tolerates_cycles() {
        let mut decls = Declarations::default();
        decls.resources.push(DiscoveredResource::new("A", "s3.Bucket").depends("B"));
        decls.resources.push(DiscoveredResource::new("B", "s3.Bucket").depends("A"));
        assert!(Resolver::new(&decls).resolve("A").is_empty());

        decls.vars.insert(
            "X".into(),
            VarAttrRefInfo {
                attr_refs: vec![],
                var_refs: IndexMap::from([("F".to_string(), "X".to_string())]),
            },
        );
        assert!(Resolver::new(&decls).resolve("X").is_empty());
    }

    #[test]
    fn test_transitive_usages_follow_own() {
        let mut decls = Declarations::default();
        decls.resources.push(
            DiscoveredResource::new("Function", "lambda.Function")
                .depends("Role")
                .attr_ref(usage("Role", "Arn", "Role")),
        );
        decls.resources.push(
            DiscoveredResource::new("Role", "iam.Role").attr_ref(usage("Bucket", "Arn", "Policy.Resource")),
        );
        let resolved = Resolver::new(&decls).resolve("Function");
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].origin, Origin::Own);
        assert_eq!(resolved[1].origin, Origin::Transitive);
        assert_eq!(resolved[1].resource, "Bucket");
    }

    #[test]
    fn test_path_stripped_match() {
        let usages = vec![ResolvedUsage {
            path: FieldPath::parse("Policies.PolicyDocument.Statement.Resource"),
            resource: "Table".into(),
            attribute: "Arn".into(),
            origin: Origin::Own,
        }];
        let mut value = Value::from_json(&json!({
            "Policies": [{
                "PolicyDocument": {
                    "Statement": [{ "Resource": [{ "Fn::GetAtt": ["", "Arn"] }] }]
                }
            }]
        }))
        .unwrap();

        repair_value("Role", &mut value, &usages).unwrap();
        let repaired = value
            .pointer(&FieldPath::parse(
                "Policies[0].PolicyDocument.Statement[0].Resource[0]",
            ))
            .unwrap();
        assert_eq!(repaired, &Value::get_att("Table", "Arn"));
    }

    #[test]
    fn test_exact_match_beats_suffix() {
        let usages = vec![
            ResolvedUsage {
                path: FieldPath::parse("Arn"),
                resource: "Wrong".into(),
                attribute: "Arn".into(),
                origin: Origin::Own,
            },
            ResolvedUsage {
                path: FieldPath::parse("Target.Arn"),
                resource: "Right".into(),
                attribute: "Arn".into(),
                origin: Origin::Own,
            },
        ];
        let found = find_usage(&usages, &FieldPath::parse("Target.Arn"), "Arn").unwrap();
        assert_eq!(found.resource, "Right");
    }

    #[test]
    fn test_suffix_match_inside_intrinsic() {
        let usages = vec![ResolvedUsage {
            path: FieldPath::parse("Values"),
            resource: "Queue".into(),
            attribute: "Arn".into(),
            origin: Origin::Own,
        }];
        let mut value = Value::from_json(&json!({
            "Name": { "Fn::Join": [":", [{ "Fn::GetAtt": ["", "Arn"] }, "suffix"]] }
        }))
        .unwrap();

        repair_value("Rule", &mut value, &usages).unwrap();
        let joined = value.get("Name").and_then(Value::as_intrinsic).unwrap();
        let Intrinsic::Join { values, .. } = joined else {
            panic!("expected join");
        };
        assert_eq!(values.as_array().unwrap()[0], Value::get_att("Queue", "Arn"));
    }

    #[test]
    fn test_existing_references_untouched() {
        let mut value = Value::object([
            ("A", Value::get_att("Other", "Arn")),
            ("B", Value::sub("${Bucket.Arn}")),
        ]);
        let before = value.clone();
        repair_value("X", &mut value, &[]).unwrap();
        assert_eq!(value, before);
    }

    #[test]
    fn test_unmatched_reference_is_an_error() {
        let mut value = Value::object([("Role", Value::intrinsic(Intrinsic::GetAtt(AttrRef::unresolved("Arn"))))]);
        let err = repair_value("Function", &mut value, &[]).unwrap_err();
        match *err {
            Error::UnresolvedReference { name, path, attribute } => {
                assert_eq!(name, "Function");
                assert_eq!(path, "Role");
                assert_eq!(attribute, "Arn");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
