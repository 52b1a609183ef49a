//! Conversion between [`Value`] and the JSON wire form.
//!
//! Encoding is total. Decoding recognizes the fixed intrinsic keys and
//! rejects malformed argument lists; unknown `Fn::` keys survive as
//! [`Intrinsic::Unknown`].

use indexmap::IndexMap;
use serde_json::{Map, Value as Json, json};
use thiserror::Error;

use crate::{AttrRef, FieldPath, Intrinsic, Value, intrinsic::*};

/// Maximum nesting of intrinsic functions inside one another.
pub const MAX_INTRINSIC_DEPTH: usize = 64;

/// Errors raised while decoding a wire value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("malformed {key} at '{path}': expected {expected}")]
    Malformed {
        key: String,
        path: String,
        expected: &'static str,
    },

    #[error("intrinsic nesting exceeds {limit} levels at '{path}': {}", .chain.join(" -> "))]
    TooDeep {
        path: String,
        limit: usize,
        chain: Vec<String>,
    },
}

impl Value {
    /// Encode into the JSON wire form.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => Json::Number(n.clone()),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Value::Intrinsic(intrinsic) => intrinsic.to_json(),
        }
    }

    /// Decode from the JSON wire form with the default depth guard.
    pub fn from_json(json: &Json) -> Result<Value, WireError> {
        Decoder::new().decode(json)
    }
}

impl Intrinsic {
    /// Encode as a single-key wire object.
    pub fn to_json(&self) -> Json {
        let args = match self {
            Intrinsic::Ref(name) => json!(name),
            Intrinsic::GetAtt(attr) => json!([attr.resource, attr.attribute]),
            Intrinsic::Sub {
                template,
                variables,
            } => {
                if variables.is_empty() {
                    json!(template)
                } else {
                    json!([template, map_to_json(variables)])
                }
            }
            Intrinsic::Join { delimiter, values } => json!([delimiter, values.to_json()]),
            Intrinsic::Select { index, list } => json!([index.to_json(), list.to_json()]),
            Intrinsic::If {
                condition,
                if_true,
                if_false,
            } => json!([condition, if_true.to_json(), if_false.to_json()]),
            Intrinsic::Equals(a, b) => json!([a.to_json(), b.to_json()]),
            Intrinsic::And(items) | Intrinsic::Or(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Intrinsic::Not(v) => json!([v.to_json()]),
            Intrinsic::Condition(name) => json!(name),
            Intrinsic::Split { delimiter, source } => json!([delimiter, source.to_json()]),
            Intrinsic::Base64(v) | Intrinsic::ImportValue(v) | Intrinsic::GetAZs(v) => v.to_json(),
            Intrinsic::Cidr {
                ip_block,
                count,
                cidr_bits,
            } => json!([ip_block.to_json(), count.to_json(), cidr_bits.to_json()]),
            Intrinsic::FindInMap {
                map_name,
                top_key,
                second_key,
            } => json!([map_name.to_json(), top_key.to_json(), second_key.to_json()]),
            Intrinsic::Transform { name, parameters } => {
                json!({ "Name": name, "Parameters": map_to_json(parameters) })
            }
            Intrinsic::Unknown { args, .. } => args.clone(),
        };
        let mut object = Map::new();
        object.insert(self.key().to_string(), args);
        Json::Object(object)
    }
}

fn map_to_json(map: &IndexMap<String, Value>) -> Json {
    Json::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<Map<_, _>>(),
    )
}

/// Recursive decoder with a bound on intrinsic nesting.
///
/// The chain of intrinsic keys currently being expanded is kept so that a
/// runaway argument (for instance an availability-zone lookup whose region
/// is itself an availability-zone lookup, repeated) is reported with the
/// offending sequence instead of exhausting the stack.
#[derive(Debug)]
pub struct Decoder {
    limit: usize,
    chain: Vec<String>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_limit(MAX_INTRINSIC_DEPTH)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            chain: Vec::new(),
        }
    }

    pub fn decode(&mut self, json: &Json) -> Result<Value, WireError> {
        self.decode_at(json, &FieldPath::root())
    }

    /// Decode a value located at `path` (used only for diagnostics).
    pub fn decode_at(&mut self, json: &Json, path: &FieldPath) -> Result<Value, WireError> {
        match json {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => Ok(Value::Number(n.clone())),
            Json::String(s) => Ok(Value::String(s.clone())),
            Json::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.decode_at(item, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Json::Object(map) => {
                if let Some((key, args)) = single_entry(map)
                    && looks_intrinsic(key, args)
                {
                    return self.enter(key, args, path);
                }
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), self.decode_at(v, &path.key(k.clone()))?);
                }
                Ok(Value::Object(out))
            }
        }
    }

    fn enter(&mut self, key: &str, args: &Json, path: &FieldPath) -> Result<Value, WireError> {
        if self.chain.len() >= self.limit {
            let mut chain = self.chain.clone();
            chain.push(key.to_string());
            return Err(WireError::TooDeep {
                path: path.to_string(),
                limit: self.limit,
                chain,
            });
        }
        self.chain.push(key.to_string());
        let result = self.decode_intrinsic(key, args, &path.key(key));
        self.chain.pop();
        result.map(Value::intrinsic)
    }

    fn decode_intrinsic(
        &mut self,
        key: &str,
        args: &Json,
        path: &FieldPath,
    ) -> Result<Intrinsic, WireError> {
        let malformed = |expected| WireError::Malformed {
            key: key.to_string(),
            path: path.to_string(),
            expected,
        };

        let intrinsic = match key {
            REF => Intrinsic::Ref(args.as_str().ok_or_else(|| malformed("a string"))?.into()),
            GET_ATT if has_computed_attribute(args) => Intrinsic::Unknown {
                key: key.to_string(),
                args: args.clone(),
            },
            GET_ATT => Intrinsic::GetAtt(decode_get_att(args).ok_or_else(|| {
                malformed("[resource, attribute] or \"resource.attribute\"")
            })?),
            SUB => match args {
                Json::String(template) => Intrinsic::Sub {
                    template: template.clone(),
                    variables: IndexMap::new(),
                },
                Json::Array(items) if items.len() == 2 => {
                    let template = items[0]
                        .as_str()
                        .ok_or_else(|| malformed("[template, variables]"))?;
                    let vars = items[1]
                        .as_object()
                        .ok_or_else(|| malformed("[template, variables]"))?;
                    Intrinsic::Sub {
                        template: template.to_string(),
                        variables: self.decode_map(vars, &path.key("Variables"))?,
                    }
                }
                _ => return Err(malformed("a template string or [template, variables]")),
            },
            JOIN => {
                let [delimiter, values] = fixed::<2>(args).ok_or_else(|| malformed("[delimiter, values]"))?;
                Intrinsic::Join {
                    delimiter: delimiter
                        .as_str()
                        .ok_or_else(|| malformed("[delimiter, values]"))?
                        .to_string(),
                    values: self.decode_at(values, &path.key("Values"))?,
                }
            }
            SELECT => {
                let [index, list] = fixed::<2>(args).ok_or_else(|| malformed("[index, list]"))?;
                Intrinsic::Select {
                    index: self.decode_at(index, &path.key("Index"))?,
                    list: self.decode_at(list, &path.key("List"))?,
                }
            }
            IF => {
                let [condition, if_true, if_false] = fixed::<3>(args)
                    .ok_or_else(|| malformed("[condition, value_if_true, value_if_false]"))?;
                Intrinsic::If {
                    condition: condition
                        .as_str()
                        .ok_or_else(|| malformed("a condition name as first argument"))?
                        .to_string(),
                    if_true: self.decode_at(if_true, &path.key("ValueIfTrue"))?,
                    if_false: self.decode_at(if_false, &path.key("ValueIfFalse"))?,
                }
            }
            EQUALS => {
                let [a, b] = fixed::<2>(args).ok_or_else(|| malformed("[value1, value2]"))?;
                Intrinsic::Equals(
                    self.decode_at(a, &path.key("Value1"))?,
                    self.decode_at(b, &path.key("Value2"))?,
                )
            }
            AND | OR => {
                let items = args
                    .as_array()
                    .ok_or_else(|| malformed("a list of conditions"))?;
                let decoded = items
                    .iter()
                    .enumerate()
                    .map(|(i, c)| self.decode_at(c, &path.key("Conditions").index(i)))
                    .collect::<Result<Vec<_>, _>>()?;
                if key == AND {
                    Intrinsic::And(decoded)
                } else {
                    Intrinsic::Or(decoded)
                }
            }
            NOT => {
                let [condition] = fixed::<1>(args).ok_or_else(|| malformed("[condition]"))?;
                Intrinsic::Not(self.decode_at(condition, &path.key("Condition"))?)
            }
            CONDITION => {
                Intrinsic::Condition(args.as_str().ok_or_else(|| malformed("a string"))?.into())
            }
            SPLIT => {
                let [delimiter, source] =
                    fixed::<2>(args).ok_or_else(|| malformed("[delimiter, source]"))?;
                Intrinsic::Split {
                    delimiter: delimiter
                        .as_str()
                        .ok_or_else(|| malformed("[delimiter, source]"))?
                        .to_string(),
                    source: self.decode_at(source, &path.key("Source"))?,
                }
            }
            BASE64 => Intrinsic::Base64(self.decode_at(args, &path.key("Value"))?),
            CIDR => {
                let [ip_block, count, cidr_bits] =
                    fixed::<3>(args).ok_or_else(|| malformed("[ip_block, count, cidr_bits]"))?;
                Intrinsic::Cidr {
                    ip_block: self.decode_at(ip_block, &path.key("IpBlock"))?,
                    count: self.decode_at(count, &path.key("Count"))?,
                    cidr_bits: self.decode_at(cidr_bits, &path.key("CidrBits"))?,
                }
            }
            IMPORT_VALUE => Intrinsic::ImportValue(self.decode_at(args, &path.key("Name"))?),
            FIND_IN_MAP => {
                let [map_name, top_key, second_key] = fixed::<3>(args)
                    .ok_or_else(|| malformed("[map_name, top_level_key, second_level_key]"))?;
                Intrinsic::FindInMap {
                    map_name: self.decode_at(map_name, &path.key("MapName"))?,
                    top_key: self.decode_at(top_key, &path.key("TopLevelKey"))?,
                    second_key: self.decode_at(second_key, &path.key("SecondLevelKey"))?,
                }
            }
            TRANSFORM => {
                let object = args
                    .as_object()
                    .ok_or_else(|| malformed("{Name, Parameters}"))?;
                let name = object
                    .get("Name")
                    .and_then(Json::as_str)
                    .ok_or_else(|| malformed("a Name string"))?;
                let parameters = match object.get("Parameters") {
                    Some(Json::Object(params)) => {
                        self.decode_map(params, &path.key("Parameters"))?
                    }
                    None => IndexMap::new(),
                    Some(_) => return Err(malformed("a Parameters object")),
                };
                Intrinsic::Transform {
                    name: name.to_string(),
                    parameters,
                }
            }
            GET_AZS => Intrinsic::GetAZs(self.decode_at(args, &path.key("Region"))?),
            _ => Intrinsic::Unknown {
                key: key.to_string(),
                args: args.clone(),
            },
        };
        Ok(intrinsic)
    }

    fn decode_map(
        &mut self,
        map: &Map<String, Json>,
        path: &FieldPath,
    ) -> Result<IndexMap<String, Value>, WireError> {
        let mut out = IndexMap::with_capacity(map.len());
        for (k, v) in map {
            out.insert(k.clone(), self.decode_at(v, &path.key(k.clone()))?);
        }
        Ok(out)
    }
}

fn single_entry(map: &Map<String, Json>) -> Option<(&str, &Json)> {
    if map.len() != 1 {
        return None;
    }
    map.iter().next().map(|(k, v)| (k.as_str(), v))
}

/// Decide whether a single-key object is an intrinsic call.
///
/// `Condition` doubles as an ordinary property name (IAM statements), so it
/// only counts when its argument is a plain condition name.
fn looks_intrinsic(key: &str, args: &Json) -> bool {
    match key {
        CONDITION => args.is_string(),
        k if is_intrinsic_key(k) => true,
        k => k.starts_with("Fn::"),
    }
}

fn fixed<const N: usize>(args: &Json) -> Option<[&Json; N]> {
    let items = args.as_array()?;
    if items.len() != N {
        return None;
    }
    let refs: Vec<&Json> = items.iter().collect();
    refs.try_into().ok()
}

/// `["Res", "Attr"]` or `"Res.Attr"`. The string form splits at the first
/// dot, so `"Db.Endpoint.Address"` names attribute `Endpoint.Address`; the
/// list form takes exactly two strings.
fn decode_get_att(args: &Json) -> Option<AttrRef> {
    match args {
        Json::String(s) => {
            let (resource, attribute) = s.split_once('.')?;
            Some(AttrRef::new(resource, attribute))
        }
        _ => {
            let [resource, attribute] = fixed::<2>(args)?;
            Some(AttrRef::new(resource.as_str()?, attribute.as_str()?))
        }
    }
}

/// `["Res", {"Ref": "Name"}]`: the attribute is chosen at deploy time and
/// the call is kept verbatim.
fn has_computed_attribute(args: &Json) -> bool {
    matches!(fixed::<2>(args), Some([resource, attribute]) if resource.is_string() && attribute.is_object())
}
