//! Template document sections.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value as Json};

use crate::Value;

/// The only template format version in existence.
pub const FORMAT_VERSION: &str = "2010-09-09";

/// Transform marker required by serverless-extension resources.
pub const SERVERLESS_TRANSFORM: &str = "AWS::Serverless-2016-10-31";

/// Why a logical name is rejected, or `None` if it is valid.
///
/// Logical names are non-empty and ASCII alphanumeric.
pub fn logical_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("name is empty");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Some("name contains punctuation or spaces");
    }
    None
}

/// A complete template document.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub format_version: String,
    pub description: Option<String>,
    /// A single macro name or a list of them.
    pub transform: Option<Value>,
    pub parameters: IndexMap<String, Parameter>,
    pub mappings: IndexMap<String, Value>,
    pub conditions: IndexMap<String, Value>,
    pub resources: IndexMap<String, ResourceDef>,
    pub outputs: IndexMap<String, Output>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description: None,
            transform: None,
            parameters: IndexMap::new(),
            mappings: IndexMap::new(),
            conditions: IndexMap::new(),
            resources: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the transform marker names the serverless extension.
    pub fn has_serverless_transform(&self) -> bool {
        match &self.transform {
            Some(Value::String(s)) => s == SERVERLESS_TRANSFORM,
            Some(Value::Array(items)) => items
                .iter()
                .any(|v| v.as_str() == Some(SERVERLESS_TRANSFORM)),
            _ => false,
        }
    }

    /// Encode with the canonical section order.
    ///
    /// Empty optional sections are omitted; `Resources` is always present.
    pub fn to_json(&self) -> Json {
        let mut doc = Map::new();
        doc.insert(
            "AWSTemplateFormatVersion".into(),
            Json::String(self.format_version.clone()),
        );
        if let Some(description) = &self.description {
            doc.insert("Description".into(), Json::String(description.clone()));
        }
        if let Some(transform) = &self.transform {
            doc.insert("Transform".into(), transform.to_json());
        }
        if !self.parameters.is_empty() {
            doc.insert("Parameters".into(), section(&self.parameters, Parameter::to_json));
        }
        if !self.mappings.is_empty() {
            doc.insert("Mappings".into(), section(&self.mappings, Value::to_json));
        }
        if !self.conditions.is_empty() {
            doc.insert("Conditions".into(), section(&self.conditions, Value::to_json));
        }
        doc.insert("Resources".into(), section(&self.resources, ResourceDef::to_json));
        if !self.outputs.is_empty() {
            doc.insert("Outputs".into(), section(&self.outputs, Output::to_json));
        }
        Json::Object(doc)
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn section<T>(map: &IndexMap<String, T>, encode: impl Fn(&T) -> Json) -> Json {
    Json::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), encode(v)))
            .collect::<Map<_, _>>(),
    )
}

/// One resource entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceDef {
    pub resource_type: String,
    /// `Null` when the resource has no properties.
    pub properties: Value,
    pub depends_on: Vec<String>,
    pub condition: Option<String>,
    pub deletion_policy: Option<String>,
    pub update_replace_policy: Option<String>,
    pub metadata: Option<Value>,
}

impl ResourceDef {
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
            ..Default::default()
        }
    }

    pub fn to_json(&self) -> Json {
        let mut out = Map::new();
        out.insert("Type".into(), Json::String(self.resource_type.clone()));
        if let Some(condition) = &self.condition {
            out.insert("Condition".into(), Json::String(condition.clone()));
        }
        if !self.depends_on.is_empty() {
            out.insert(
                "DependsOn".into(),
                Json::Array(self.depends_on.iter().cloned().map(Json::String).collect()),
            );
        }
        let has_properties = match &self.properties {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            _ => true,
        };
        if has_properties {
            out.insert("Properties".into(), self.properties.to_json());
        }
        if let Some(policy) = &self.deletion_policy {
            out.insert("DeletionPolicy".into(), Json::String(policy.clone()));
        }
        if let Some(policy) = &self.update_replace_policy {
            out.insert("UpdateReplacePolicy".into(), Json::String(policy.clone()));
        }
        if let Some(metadata) = &self.metadata {
            out.insert("Metadata".into(), metadata.to_json());
        }
        Json::Object(out)
    }
}

/// A template parameter declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameter {
    pub param_type: String,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub allowed_values: Vec<Value>,
    pub allowed_pattern: Option<String>,
    pub constraint_description: Option<String>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub min_value: Option<Number>,
    pub max_value: Option<Number>,
    pub no_echo: bool,
}

impl Parameter {
    pub fn new(param_type: impl Into<String>) -> Self {
        Self {
            param_type: param_type.into(),
            ..Default::default()
        }
    }

    pub fn to_json(&self) -> Json {
        let mut out = Map::new();
        out.insert("Type".into(), Json::String(self.param_type.clone()));
        if let Some(description) = &self.description {
            out.insert("Description".into(), Json::String(description.clone()));
        }
        if let Some(default) = &self.default {
            out.insert("Default".into(), default.to_json());
        }
        if !self.allowed_values.is_empty() {
            out.insert(
                "AllowedValues".into(),
                Json::Array(self.allowed_values.iter().map(Value::to_json).collect()),
            );
        }
        if let Some(pattern) = &self.allowed_pattern {
            out.insert("AllowedPattern".into(), Json::String(pattern.clone()));
        }
        if let Some(text) = &self.constraint_description {
            out.insert("ConstraintDescription".into(), Json::String(text.clone()));
        }
        if let Some(n) = self.min_length {
            out.insert("MinLength".into(), Json::from(n));
        }
        if let Some(n) = self.max_length {
            out.insert("MaxLength".into(), Json::from(n));
        }
        if let Some(n) = &self.min_value {
            out.insert("MinValue".into(), Json::Number(n.clone()));
        }
        if let Some(n) = &self.max_value {
            out.insert("MaxValue".into(), Json::Number(n.clone()));
        }
        if self.no_echo {
            out.insert("NoEcho".into(), Json::Bool(true));
        }
        Json::Object(out)
    }
}

/// A template output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Output {
    pub description: Option<String>,
    pub value: Value,
    pub export: Option<Export>,
    pub condition: Option<String>,
}

impl Output {
    pub fn to_json(&self) -> Json {
        let mut out = Map::new();
        if let Some(description) = &self.description {
            out.insert("Description".into(), Json::String(description.clone()));
        }
        if let Some(condition) = &self.condition {
            out.insert("Condition".into(), Json::String(condition.clone()));
        }
        out.insert("Value".into(), self.value.to_json());
        if let Some(export) = &self.export {
            let mut e = Map::new();
            e.insert("Name".into(), export.name.to_json());
            out.insert("Export".into(), Json::Object(e));
        }
        Json::Object(out)
    }
}

/// The `Export` block of an output.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    /// A literal string or an intrinsic producing one.
    pub name: Value,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_section_order_and_omission() {
        let mut template = Template::new();
        template.description = Some("demo".into());
        template.resources.insert(
            "Bucket".into(),
            ResourceDef::new("AWS::S3::Bucket", Value::Null),
        );
        let json = template.to_json();
        let keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["AWSTemplateFormatVersion", "Description", "Resources"]);
        assert_eq!(json["Resources"]["Bucket"], json!({ "Type": "AWS::S3::Bucket" }));
    }

    #[test]
    fn test_resource_attributes() {
        let mut def = ResourceDef::new(
            "AWS::SQS::Queue",
            Value::object([("QueueName", Value::from("jobs"))]),
        );
        def.depends_on = vec!["Topic".into()];
        def.deletion_policy = Some("Retain".into());
        assert_eq!(
            def.to_json(),
            json!({
                "Type": "AWS::SQS::Queue",
                "DependsOn": ["Topic"],
                "Properties": { "QueueName": "jobs" },
                "DeletionPolicy": "Retain"
            })
        );
    }

    #[test]
    fn test_parameter_fields() {
        let param = Parameter {
            param_type: "Number".into(),
            default: Some(Value::from(3i64)),
            min_value: Some(1.into()),
            max_value: Some(10.into()),
            no_echo: false,
            ..Default::default()
        };
        assert_eq!(
            param.to_json(),
            json!({ "Type": "Number", "Default": 3, "MinValue": 1, "MaxValue": 10 })
        );
    }

    #[test]
    fn test_output_export() {
        let output = Output {
            value: Value::get_att("Bucket", "Arn"),
            export: Some(Export {
                name: Value::sub("${AWS::StackName}-bucket"),
            }),
            ..Default::default()
        };
        assert_eq!(
            output.to_json(),
            json!({
                "Value": { "Fn::GetAtt": ["Bucket", "Arn"] },
                "Export": { "Name": { "Fn::Sub": "${AWS::StackName}-bucket" } }
            })
        );
    }

    #[test]
    fn test_serverless_transform_detection() {
        let mut template = Template::new();
        assert!(!template.has_serverless_transform());
        template.transform = Some(Value::from(vec![Value::from(SERVERLESS_TRANSFORM)]));
        assert!(template.has_serverless_transform());
    }

    #[test]
    fn test_logical_names() {
        assert_eq!(logical_name_problem("DataBucket"), None);
        assert_eq!(logical_name_problem("Queue2"), None);
        assert_eq!(logical_name_problem(""), Some("name is empty"));
        assert!(logical_name_problem("my_bucket").is_some());
        assert!(logical_name_problem("My Bucket").is_some());
        assert!(logical_name_problem("Bücket").is_some());
    }
}
