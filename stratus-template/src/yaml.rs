//! YAML input: conversion to the JSON tree with short-form tag expansion.

use serde_json::{Map, Number, Value as Json};
use serde_yaml::Value as Yaml;

/// Nesting bound for the YAML tree itself.
const MAX_YAML_DEPTH: usize = 512;

/// Convert a YAML tree to JSON, expanding `!Ref`, `!GetAtt`, `!Sub` and
/// the other short-form tags to their single-key long form.
pub fn to_json(value: &Yaml) -> Result<Json, String> {
    convert(value, 0)
}

fn convert(value: &Yaml, depth: usize) -> Result<Json, String> {
    if depth > MAX_YAML_DEPTH {
        return Err(format!("document nests deeper than {} levels", MAX_YAML_DEPTH));
    }
    Ok(match value {
        Yaml::Null => Json::Null,
        Yaml::Bool(b) => Json::Bool(*b),
        Yaml::Number(n) => number(n),
        Yaml::String(s) => Json::String(s.clone()),
        Yaml::Sequence(items) => Json::Array(
            items
                .iter()
                .map(|item| convert(item, depth + 1))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(key_string(k)?, convert(v, depth + 1)?);
            }
            Json::Object(out)
        }
        Yaml::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let name = tag.trim_start_matches('!');
            let inner = convert(&tagged.value, depth + 1)?;
            let mut out = Map::new();
            out.insert(long_form(name), inner);
            Json::Object(out)
        }
    })
}

/// Long-form key for a short-form tag name.
fn long_form(name: &str) -> String {
    match name {
        "Ref" | "Condition" => name.to_string(),
        other => format!("Fn::{}", other),
    }
}

fn number(n: &serde_yaml::Number) -> Json {
    if let Some(i) = n.as_i64() {
        Json::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Json::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Json::Number)
            .unwrap_or_else(|| Json::String(n.to_string()))
    }
}

fn key_string(key: &Yaml) -> Result<String, String> {
    match key {
        Yaml::String(s) => Ok(s.clone()),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        _ => Err("mapping keys must be scalars".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(src: &str) -> Json {
        to_json(&serde_yaml::from_str(src).unwrap()).unwrap()
    }

    #[test]
    fn test_short_form_tags() {
        let json = parse(
            r#"
Bucket: !Ref DataBucket
Arn: !GetAtt DataBucket.Arn
Name: !Sub "${AWS::StackName}-data"
Zones: !GetAZs ""
Pick: !Select [0, !GetAZs ""]
IsProd: !Condition Prod
"#,
        );
        assert_eq!(json["Bucket"], json!({ "Ref": "DataBucket" }));
        assert_eq!(json["Arn"], json!({ "Fn::GetAtt": "DataBucket.Arn" }));
        assert_eq!(json["Name"], json!({ "Fn::Sub": "${AWS::StackName}-data" }));
        assert_eq!(json["Pick"], json!({ "Fn::Select": [0, { "Fn::GetAZs": "" }] }));
        assert_eq!(json["IsProd"], json!({ "Condition": "Prod" }));
    }

    #[test]
    fn test_scalar_keys_and_numbers() {
        let json = parse("1: one\ntrue: yes\nratio: 0.5\ncount: 3\n");
        assert_eq!(json["1"], json!("one"));
        assert_eq!(json["true"], json!("yes"));
        assert_eq!(json["ratio"], json!(0.5));
        assert_eq!(json["count"], json!(3));
    }
}
