use stratus_ir::{Intrinsic, Value};

use super::{SchemaLookup, Shape, TypeContext};
use crate::Result;

/// Properties that hold policy or definition documents rather than typed
/// structures.
const DOCUMENT_PROPERTIES: &[&str] = &[
    "AssumeRolePolicyDocument",
    "Definition",
    "DefinitionSubstitutions",
    "KeyPolicy",
    "Metadata",
    "Policy",
    "PolicyDocument",
    "Variables",
];

/// Shapes guessed from the values themselves.
///
/// Objects whose keys all look like property names become nested types
/// named after the property; `Tags` lists use the shared `Tag` type.
#[derive(Debug, Clone, Copy, Default)]
pub struct InferredSchema;

impl SchemaLookup for InferredSchema {
    fn supports(&self, _resource_type: &str) -> bool {
        true
    }

    fn property(&self, _context: &TypeContext, property: &str, value: &Value) -> Result<Shape> {
        Ok(infer(property, value))
    }
}

fn infer(property: &str, value: &Value) -> Shape {
    if DOCUMENT_PROPERTIES.contains(&property) {
        return Shape::Json;
    }
    match value {
        Value::Object(map) if map.keys().all(|k| looks_like_property(k)) && !map.is_empty() => {
            Shape::Nested(property.to_string())
        }
        Value::Object(_) => Shape::Json,
        Value::Array(items) => {
            if property == "Tags" {
                return Shape::list(Shape::Nested("Tag".to_string()));
            }
            let item = items
                .iter()
                .find(|item| !matches!(item, Value::Intrinsic(_)))
                .map(|item| infer(property, item))
                .unwrap_or(Shape::Scalar);
            Shape::list(item)
        }
        Value::Intrinsic(intrinsic) => match &**intrinsic {
            i if i.yields_list() => Shape::list(Shape::Scalar),
            Intrinsic::If {
                if_true, if_false, ..
            } => [if_true, if_false]
                .into_iter()
                .find(|branch| !is_no_value(branch))
                .map(|branch| infer(property, branch))
                .unwrap_or(Shape::Scalar),
            _ => Shape::Scalar,
        },
        _ => Shape::Scalar,
    }
}

fn looks_like_property(key: &str) -> bool {
    key.starts_with(|c: char| c.is_ascii_uppercase()) && key.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_no_value(value: &Value) -> bool {
    matches!(value.as_intrinsic(), Some(Intrinsic::Ref(name)) if name == "AWS::NoValue")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn shape(property: &str, json: serde_json::Value) -> Shape {
        let value = Value::from_json(&json).unwrap();
        InferredSchema
            .property(&TypeContext::resource("AWS::S3::Bucket"), property, &value)
            .unwrap()
    }

    #[test]
    fn test_nested_and_json() {
        assert_eq!(
            shape("VersioningConfiguration", json!({ "Status": "Enabled" })),
            Shape::Nested("VersioningConfiguration".into())
        );
        assert_eq!(shape("PolicyDocument", json!({ "Version": "2012-10-17" })), Shape::Json);
        assert_eq!(shape("Labels", json!({ "team-name": "x" })), Shape::Json);
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            shape("Tags", json!([{ "Key": "a", "Value": "b" }])),
            Shape::list(Shape::Nested("Tag".into()))
        );
        assert_eq!(shape("Aliases", json!(["a", "b"])), Shape::list(Shape::Scalar));
        assert_eq!(
            shape("Zones", json!({ "Fn::GetAZs": "" })),
            Shape::list(Shape::Scalar)
        );
    }

    #[test]
    fn test_if_uses_live_branch() {
        assert_eq!(
            shape(
                "LoggingConfiguration",
                json!({ "Fn::If": ["Prod", { "DestinationBucketName": "logs" }, { "Ref": "AWS::NoValue" }] })
            ),
            Shape::Nested("LoggingConfiguration".into())
        );
    }
}
