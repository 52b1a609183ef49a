//! Template document parsing.
//!
//! The text is tried as JSON first, then as YAML. Sections are decoded into
//! the IR with intrinsic functions recognized; nesting of intrinsics is
//! bounded so a runaway argument chain fails with a diagnostic.

use std::{collections::BTreeSet, fmt, path::Path};

use serde_json::{Map, Value as Json};
use stratus_ir::{
    Decoder, Export, FieldPath, Intrinsic, Output, Parameter, ResourceDef, Template, Value,
};

use crate::{
    Error, Format, Result,
    error::SourceContext,
    implicit::{PSEUDO_PARAMETERS, implicit_resources},
    validate::{check_links, check_logical_name},
    yaml,
};

/// A reference to a name the template does not define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedReference {
    /// Where the reference sits, e.g. `Resources.Function.Properties.Role`.
    pub location: String,
    pub target: String,
}

impl fmt::Display for UndefinedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} refers to undefined '{}'", self.location, self.target)
    }
}

/// Result of a successful parse.
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    pub template: Template,
    pub format: Format,
    /// Resources created implicitly by serverless kinds.
    pub implicit_resources: BTreeSet<String>,
    /// Parameters referenced anywhere, including inside `Fn::Sub` text.
    pub referenced_parameters: BTreeSet<String>,
    pub warnings: Vec<UndefinedReference>,
}

impl ParsedTemplate {
    /// True if `name` is a resource, parameter, pseudo parameter or
    /// implicit resource.
    pub fn is_known_target(&self, name: &str) -> bool {
        self.template.resources.contains_key(name)
            || self.template.parameters.contains_key(name)
            || self.implicit_resources.contains(name)
            || PSEUDO_PARAMETERS.contains(&name)
    }
}

/// Parse a template file.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedTemplate> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source,
        })
    })?;
    parse_str_with_filename(&content, &path.display().to_string())
}

/// Parse a template from a string (uses "template" as the filename).
pub fn parse_str(content: &str) -> Result<ParsedTemplate> {
    parse_str_with_filename(content, "template")
}

/// Parse a template from a string with a custom filename for error reporting.
pub fn parse_str_with_filename(content: &str, filename: &str) -> Result<ParsedTemplate> {
    let ctx = SourceContext::new(content, filename);
    let (root, format) = read_tree(&ctx)?;
    let Json::Object(root) = root else {
        return Err(ctx.invalid("template root must be a mapping", None));
    };

    let template = decode_template(&ctx, &root)?;

    let implicit = template
        .resources
        .iter()
        .flat_map(|(name, def)| implicit_resources(name, def))
        .collect();
    let mut parsed = ParsedTemplate {
        template,
        format,
        implicit_resources: implicit,
        referenced_parameters: BTreeSet::new(),
        warnings: Vec::new(),
    };
    scan_references(&mut parsed);

    for warning in &parsed.warnings {
        tracing::warn!(file = filename, "{}", warning);
    }
    tracing::debug!(
        file = filename,
        %format,
        resources = parsed.template.resources.len(),
        "parsed template"
    );
    Ok(parsed)
}

fn read_tree(ctx: &SourceContext) -> Result<(Json, Format)> {
    let json_err = match serde_json::from_str::<Json>(ctx.src()) {
        Ok(tree) => return Ok((tree, Format::Json)),
        Err(e) => e,
    };
    let yaml_err = match serde_yaml::from_str::<serde_yaml::Value>(ctx.src()) {
        Ok(tree) => {
            let json = yaml::to_json(&tree)
                .map_err(|message| ctx.syntax_error("YAML", message, None))?;
            return Ok((json, Format::Yaml));
        }
        Err(e) => e,
    };

    if ctx.src().trim_start().starts_with('{') {
        let offset = ctx.offset_of(json_err.line(), json_err.column());
        Err(ctx.syntax_error("JSON", json_err.to_string(), Some(offset)))
    } else {
        let offset = yaml_err.location().map(|l| l.index());
        Err(ctx.syntax_error("YAML", yaml_err.to_string(), offset))
    }
}

fn decode_template(ctx: &SourceContext, root: &Map<String, Json>) -> Result<Template> {
    let mut template = Template::new();

    if let Some(version) = root.get("AWSTemplateFormatVersion") {
        template.format_version = version
            .as_str()
            .ok_or_else(|| ctx.invalid("AWSTemplateFormatVersion must be a string", None))?
            .to_string();
    }
    if let Some(description) = root.get("Description") {
        template.description = Some(
            description
                .as_str()
                .ok_or_else(|| ctx.invalid("Description must be a string", None))?
                .to_string(),
        );
    }
    if let Some(transform) = root.get("Transform") {
        template.transform = Some(decode_value(ctx, "Transform", transform, "Transform")?);
    }

    for (name, body) in section(ctx, root, "Parameters")? {
        check_logical_name(ctx, name, "Parameters")?;
        template
            .parameters
            .insert(name.clone(), decode_parameter(ctx, name, body)?);
    }
    for (name, body) in section(ctx, root, "Mappings")? {
        check_logical_name(ctx, name, "Mappings")?;
        template
            .mappings
            .insert(name.clone(), decode_value(ctx, name, body, "Mappings")?);
    }
    for (name, body) in section(ctx, root, "Conditions")? {
        check_logical_name(ctx, name, "Conditions")?;
        template
            .conditions
            .insert(name.clone(), decode_value(ctx, name, body, "Conditions")?);
    }

    if !root.contains_key("Resources") {
        return Err(ctx.invalid("template has no Resources section", None));
    }
    for (name, body) in section(ctx, root, "Resources")? {
        check_logical_name(ctx, name, "Resources")?;
        template
            .resources
            .insert(name.clone(), decode_resource(ctx, name, body)?);
    }

    for (name, body) in section(ctx, root, "Outputs")? {
        check_logical_name(ctx, name, "Outputs")?;
        template
            .outputs
            .insert(name.clone(), decode_output(ctx, name, body)?);
    }

    check_links(ctx, &template)?;
    Ok(template)
}

fn section<'a>(
    ctx: &SourceContext,
    root: &'a Map<String, Json>,
    key: &str,
) -> Result<Vec<(&'a String, &'a Json)>> {
    match root.get(key) {
        None | Some(Json::Null) => Ok(Vec::new()),
        Some(Json::Object(map)) => Ok(map.iter().collect()),
        Some(_) => Err(ctx.invalid(format!("{} must be a mapping", key), Some(key))),
    }
}

fn decode_value(ctx: &SourceContext, owner: &str, json: &Json, section: &str) -> Result<Value> {
    Decoder::new()
        .decode_at(json, &FieldPath::root().key(section).key(owner))
        .map_err(|e| ctx.intrinsic_error(owner, e))
}

fn entry<'a>(
    ctx: &SourceContext,
    name: &str,
    body: &'a Json,
    section: &str,
) -> Result<&'a Map<String, Json>> {
    body.as_object()
        .ok_or_else(|| ctx.invalid(format!("{} entry '{}' must be a mapping", section, name), Some(name)))
}

fn string_field(
    ctx: &SourceContext,
    name: &str,
    body: &Map<String, Json>,
    field: &str,
) -> Result<Option<String>> {
    match body.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s.clone())),
        Some(Json::Number(n)) => Ok(Some(n.to_string())),
        Some(Json::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(ctx.invalid(format!("{}.{} must be a string", name, field), Some(name))),
    }
}

fn decode_parameter(ctx: &SourceContext, name: &str, body: &Json) -> Result<Parameter> {
    let body = entry(ctx, name, body, "Parameters")?;
    let param_type = string_field(ctx, name, body, "Type")?
        .ok_or_else(|| ctx.invalid(format!("parameter '{}' has no Type", name), Some(name)))?;

    let mut param = Parameter::new(param_type);
    param.description = string_field(ctx, name, body, "Description")?;
    if let Some(default) = body.get("Default") {
        param.default = Some(decode_value(ctx, name, default, "Parameters")?);
    }
    if let Some(allowed) = body.get("AllowedValues") {
        let Json::Array(items) = allowed else {
            return Err(ctx.invalid(format!("{}.AllowedValues must be a list", name), Some(name)));
        };
        param.allowed_values = items
            .iter()
            .map(|item| decode_value(ctx, name, item, "Parameters"))
            .collect::<Result<_>>()?;
    }
    param.allowed_pattern = string_field(ctx, name, body, "AllowedPattern")?;
    param.constraint_description = string_field(ctx, name, body, "ConstraintDescription")?;
    param.min_length = length_field(ctx, name, body, "MinLength")?;
    param.max_length = length_field(ctx, name, body, "MaxLength")?;
    param.min_value = number_field(ctx, name, body, "MinValue")?;
    param.max_value = number_field(ctx, name, body, "MaxValue")?;
    param.no_echo = match body.get("NoEcho") {
        None => false,
        Some(Json::Bool(b)) => *b,
        Some(Json::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(_) => {
            return Err(ctx.invalid(format!("{}.NoEcho must be a boolean", name), Some(name)));
        }
    };
    Ok(param)
}

fn number_field(
    ctx: &SourceContext,
    name: &str,
    body: &Map<String, Json>,
    field: &str,
) -> Result<Option<serde_json::Number>> {
    match body.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::Number(n)) => Ok(Some(n.clone())),
        Some(Json::String(s)) => s
            .parse::<serde_json::Number>()
            .map(Some)
            .map_err(|_| ctx.invalid(format!("{}.{} must be a number", name, field), Some(name))),
        Some(_) => Err(ctx.invalid(format!("{}.{} must be a number", name, field), Some(name))),
    }
}

fn length_field(
    ctx: &SourceContext,
    name: &str,
    body: &Map<String, Json>,
    field: &str,
) -> Result<Option<u32>> {
    let Some(n) = number_field(ctx, name, body, field)? else {
        return Ok(None);
    };
    n.as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| {
            ctx.invalid(
                format!("{}.{} must be a non-negative integer", name, field),
                Some(name),
            )
        })
}

fn decode_resource(ctx: &SourceContext, name: &str, body: &Json) -> Result<ResourceDef> {
    let body = entry(ctx, name, body, "Resources")?;
    let resource_type = string_field(ctx, name, body, "Type")?
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ctx.invalid(format!("resource '{}' has no Type", name), Some(name)))?;

    let mut def = ResourceDef::new(resource_type, Value::Null);
    if let Some(properties) = body.get("Properties") {
        def.properties = decode_value(ctx, name, properties, "Resources")?;
    }
    def.depends_on = match body.get("DependsOn") {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::String(s)) => vec![s.clone()],
        Some(Json::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ctx.invalid(format!("{}.DependsOn must list names", name), Some(name))
                })
            })
            .collect::<Result<_>>()?,
        Some(_) => {
            return Err(ctx.invalid(
                format!("{}.DependsOn must be a name or a list of names", name),
                Some(name),
            ));
        }
    };
    def.condition = string_field(ctx, name, body, "Condition")?;
    def.deletion_policy = string_field(ctx, name, body, "DeletionPolicy")?;
    def.update_replace_policy = string_field(ctx, name, body, "UpdateReplacePolicy")?;
    if let Some(metadata) = body.get("Metadata") {
        def.metadata = Some(decode_value(ctx, name, metadata, "Resources")?);
    }
    Ok(def)
}

fn decode_output(ctx: &SourceContext, name: &str, body: &Json) -> Result<Output> {
    let body = entry(ctx, name, body, "Outputs")?;
    let value = body
        .get("Value")
        .ok_or_else(|| ctx.invalid(format!("output '{}' has no Value", name), Some(name)))?;

    let export = match body.get("Export") {
        None | Some(Json::Null) => None,
        Some(Json::Object(export)) => {
            let export_name = export.get("Name").ok_or_else(|| {
                ctx.invalid(format!("{}.Export has no Name", name), Some(name))
            })?;
            Some(Export {
                name: decode_value(ctx, name, export_name, "Outputs")?,
            })
        }
        Some(_) => {
            return Err(ctx.invalid(format!("{}.Export must be a mapping", name), Some(name)));
        }
    };

    Ok(Output {
        description: string_field(ctx, name, body, "Description")?,
        value: decode_value(ctx, name, value, "Outputs")?,
        export,
        condition: string_field(ctx, name, body, "Condition")?,
    })
}

/// Collect parameter usages and undefined-reference warnings.
fn scan_references(parsed: &mut ParsedTemplate) {
    let mut found: Vec<(String, String)> = Vec::new();
    let mut visit = |location: String, value: &Value| {
        value.walk(&FieldPath::root(), &mut |path, node| {
            let Value::Intrinsic(intrinsic) = node else {
                return;
            };
            let at = if path.is_root() {
                location.clone()
            } else {
                format!("{}.{}", location, path)
            };
            if let Some(target) = intrinsic.target() {
                found.push((at.clone(), target.to_string()));
            }
            if let Intrinsic::Sub {
                template,
                variables,
            } = &**intrinsic
            {
                for placeholder in Intrinsic::sub_placeholders(template) {
                    let head = placeholder.split('.').next().unwrap_or(placeholder);
                    if !variables.contains_key(head) {
                        found.push((at.clone(), head.to_string()));
                    }
                }
            }
        });
    };

    let template = &parsed.template;
    for (name, def) in &template.resources {
        visit(format!("Resources.{}.Properties", name), &def.properties);
        if let Some(metadata) = &def.metadata {
            visit(format!("Resources.{}.Metadata", name), metadata);
        }
    }
    for (name, condition) in &template.conditions {
        visit(format!("Conditions.{}", name), condition);
    }
    for (name, output) in &template.outputs {
        visit(format!("Outputs.{}.Value", name), &output.value);
        if let Some(export) = &output.export {
            visit(format!("Outputs.{}.Export.Name", name), &export.name);
        }
    }

    let mut referenced = BTreeSet::new();
    let mut warnings = Vec::new();
    let mut seen = BTreeSet::new();
    for (location, target) in found {
        if template.parameters.contains_key(&target) {
            referenced.insert(target.clone());
        }
        if !parsed.is_known_target(&target) && seen.insert((location.clone(), target.clone())) {
            warnings.push(UndefinedReference { location, target });
        }
    }
    parsed.referenced_parameters = referenced;
    parsed.warnings = warnings;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_json() {
        let parsed = parse_str(
            r#"{
                "AWSTemplateFormatVersion": "2010-09-09",
                "Resources": {
                    "DataBucket": { "Type": "AWS::S3::Bucket" },
                    "Queue": {
                        "Type": "AWS::SQS::Queue",
                        "DependsOn": "DataBucket",
                        "Properties": { "QueueName": { "Fn::Sub": "${AWS::StackName}-q" } }
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.format, Format::Json);
        let queue = &parsed.template.resources["Queue"];
        assert_eq!(queue.depends_on, vec!["DataBucket"]);
        assert!(matches!(
            queue.properties.get("QueueName").and_then(Value::as_intrinsic),
            Some(Intrinsic::Sub { .. })
        ));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_parse_yaml_with_tags() {
        let parsed = parse_str(
            r#"
AWSTemplateFormatVersion: "2010-09-09"
Parameters:
  Env:
    Type: String
    AllowedValues: [dev, prod]
Resources:
  Topic:
    Type: AWS::SNS::Topic
    Properties:
      TopicName: !Sub "${Env}-events"
Outputs:
  TopicArn:
    Value: !Ref Topic
    Export:
      Name: !Sub "${AWS::StackName}-topic"
"#,
        )
        .unwrap();
        assert_eq!(parsed.format, Format::Yaml);
        assert_eq!(parsed.template.parameters["Env"].allowed_values.len(), 2);
        assert_eq!(
            parsed.template.outputs["TopicArn"].value,
            Value::reference("Topic")
        );
        assert!(parsed.referenced_parameters.contains("Env"));
    }

    #[test]
    fn test_sub_only_parameter_is_referenced() {
        let parsed = parse_str(
            r#"{
                "Parameters": { "Stage": { "Type": "String" }, "Unused": { "Type": "String" } },
                "Resources": {
                    "Log": { "Type": "AWS::Logs::LogGroup",
                             "Properties": { "LogGroupName": { "Fn::Sub": "/app/${Stage}" } } }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            parsed.referenced_parameters,
            BTreeSet::from(["Stage".to_string()])
        );
    }

    #[test]
    fn test_undefined_reference_warning() {
        let parsed = parse_str(
            r#"{
                "Resources": {
                    "Fn": { "Type": "AWS::Lambda::Function",
                            "Properties": { "Role": { "Fn::GetAtt": ["MissingRole", "Arn"] } } }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(
            parsed.warnings,
            vec![UndefinedReference {
                location: "Resources.Fn.Properties.Role".into(),
                target: "MissingRole".into(),
            }]
        );
    }

    #[test]
    fn test_implicit_resources_are_known() {
        let parsed = parse_str(
            r#"{
                "Transform": "AWS::Serverless-2016-10-31",
                "Resources": {
                    "Handler": { "Type": "AWS::Serverless::Function",
                                 "Properties": { "Events": { "Root": { "Type": "Api" } } } },
                    "Perm": { "Type": "AWS::Lambda::Permission",
                              "Properties": {
                                  "Role": { "Ref": "HandlerRole" },
                                  "Api": { "Ref": "ServerlessRestApi" },
                                  "Region": { "Ref": "AWS::Region" } } }
                }
            }"#,
        )
        .unwrap();
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        assert!(parsed.template.has_serverless_transform());
    }

    #[test]
    fn test_invalid_logical_name() {
        let err = parse_str(r#"{ "Resources": { "My-Bucket": { "Type": "AWS::S3::Bucket" } } }"#)
            .unwrap_err();
        match *err {
            Error::InvalidLogicalName { name, section, .. } => {
                assert_eq!(name, "My-Bucket");
                assert_eq!(section, "Resources");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_resources() {
        let err = parse_str(r#"{ "Description": "empty" }"#).unwrap_err();
        assert_eq!(err.to_string(), "template has no Resources section");
    }

    #[test]
    fn test_syntax_error_is_located() {
        let err = parse_str("{ \"Resources\": { ").unwrap_err();
        match *err {
            Error::Syntax { format, span, .. } => {
                assert_eq!(format, "JSON");
                assert!(span.is_some());
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_runaway_intrinsic_nesting_fails() {
        let mut region = json!("us-east-1");
        for _ in 0..100 {
            region = json!({ "Fn::GetAZs": region });
        }
        let doc = json!({
            "Resources": {
                "Subnet": { "Type": "AWS::EC2::Subnet", "Properties": { "AvailabilityZone": region } }
            }
        });
        let err = parse_str(&doc.to_string()).unwrap_err();
        match *err {
            Error::Intrinsic { owner, source, .. } => {
                assert_eq!(owner, "Subnet");
                assert!(matches!(source, stratus_ir::WireError::TooDeep { .. }));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_self_referential_yaml_alias_fails() {
        let result = parse_str(
            r#"
Resources:
  Subnet:
    Type: AWS::EC2::Subnet
    Properties:
      AvailabilityZone: &zone !GetAZs *zone
"#,
        );
        match *result.unwrap_err() {
            Error::Syntax { format, .. } => assert_eq!(format, "YAML"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_get_att_with_computed_attribute() {
        let parsed = parse_str(
            r#"{
                "Parameters": { "Attr": { "Type": "String" } },
                "Resources": {
                    "B": { "Type": "AWS::S3::Bucket" },
                    "Q": {
                        "Type": "AWS::SQS::Queue",
                        "Properties": { "QueueName": { "Fn::GetAtt": ["B", { "Ref": "Attr" }] } }
                    }
                }
            }"#,
        )
        .unwrap();
        let name = parsed.template.resources["Q"].properties.get("QueueName").unwrap();
        assert!(matches!(name.as_intrinsic(), Some(Intrinsic::Unknown { .. })));
        assert_eq!(
            name.to_json(),
            json!({ "Fn::GetAtt": ["B", { "Ref": "Attr" }] })
        );
    }
}
