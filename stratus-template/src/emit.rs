//! Document emission in JSON or YAML.
//!
//! YAML output uses the short-form tags (`!Ref`, `!GetAtt`, `!Sub`, ...)
//! for every intrinsic that has one.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use serde_json::Value as Json;
use serde_yaml::{
    Mapping, Value as Yaml,
    value::{Tag, TaggedValue},
};
use stratus_ir::{Template, intrinsic};

use crate::{Error, Result};

/// Serialization syntax of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => Err(format!("unknown format '{}', expected json or yaml", other)),
        }
    }
}

/// Serialize a template in the requested format.
pub fn emit(template: &Template, format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(to_json_string(template)),
        Format::Yaml => to_yaml_string(template),
    }
}

/// Pretty-printed JSON with a trailing newline.
pub fn to_json_string(template: &Template) -> String {
    let mut out = format!("{:#}", template.to_json());
    out.push('\n');
    out
}

pub fn to_yaml_string(template: &Template) -> Result<String> {
    serde_yaml::to_string(&to_yaml(&template.to_json()))
        .map_err(|source| Box::new(Error::Emit { source }))
}

fn to_yaml(json: &Json) -> Yaml {
    match json {
        Json::Null => Yaml::Null,
        Json::Bool(b) => Yaml::Bool(*b),
        Json::Number(n) => yaml_number(n),
        Json::String(s) => Yaml::String(s.clone()),
        Json::Array(items) => Yaml::Sequence(items.iter().map(to_yaml).collect()),
        Json::Object(map) => {
            if let Some(tagged) = short_form(map) {
                return tagged;
            }
            let mut out = Mapping::with_capacity(map.len());
            for (k, v) in map {
                out.insert(Yaml::String(k.clone()), to_yaml(v));
            }
            Yaml::Mapping(out)
        }
    }
}

/// Tagged form of a single-key intrinsic object.
fn short_form(map: &serde_json::Map<String, Json>) -> Option<Yaml> {
    if map.len() != 1 {
        return None;
    }
    let (key, args) = map.iter().next()?;
    if !intrinsic::is_intrinsic_key(key) || key == intrinsic::TRANSFORM {
        return None;
    }
    if key == intrinsic::CONDITION && !args.is_string() {
        return None;
    }

    let value = match (key.as_str(), args) {
        (intrinsic::GET_ATT, Json::Array(parts))
            if parts.len() == 2 && parts.iter().all(Json::is_string) =>
        {
            let resource = parts[0].as_str().unwrap_or_default();
            let attribute = parts[1].as_str().unwrap_or_default();
            Yaml::String(format!("{}.{}", resource, attribute))
        }
        _ => to_yaml(args),
    };
    let name = key.strip_prefix("Fn::").unwrap_or(key);
    Some(Yaml::Tagged(Box::new(TaggedValue {
        tag: Tag::new(name),
        value,
    })))
}

fn yaml_number(n: &serde_json::Number) -> Yaml {
    if let Some(i) = n.as_i64() {
        Yaml::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Yaml::Number(u.into())
    } else if let Some(f) = n.as_f64() {
        Yaml::Number(f.into())
    } else {
        Yaml::String(n.to_string())
    }
}
