//! Intrinsic function variants.
//!
//! Every variant corresponds to one single-key wire object. Argument order
//! follows the wire form, and [`positional_fields`] names each position so
//! that argument `N` of a function can be addressed like a struct field.

use indexmap::IndexMap;

use crate::{FieldPath, Value};

pub const REF: &str = "Ref";
pub const GET_ATT: &str = "Fn::GetAtt";
pub const SUB: &str = "Fn::Sub";
pub const JOIN: &str = "Fn::Join";
pub const SELECT: &str = "Fn::Select";
pub const IF: &str = "Fn::If";
pub const EQUALS: &str = "Fn::Equals";
pub const AND: &str = "Fn::And";
pub const OR: &str = "Fn::Or";
pub const NOT: &str = "Fn::Not";
pub const CONDITION: &str = "Condition";
pub const SPLIT: &str = "Fn::Split";
pub const BASE64: &str = "Fn::Base64";
pub const CIDR: &str = "Fn::Cidr";
pub const IMPORT_VALUE: &str = "Fn::ImportValue";
pub const FIND_IN_MAP: &str = "Fn::FindInMap";
pub const TRANSFORM: &str = "Fn::Transform";
pub const GET_AZS: &str = "Fn::GetAZs";

/// All wire keys recognized as intrinsics, in a stable order.
pub const KNOWN_KEYS: &[&str] = &[
    REF,
    GET_ATT,
    SUB,
    JOIN,
    SELECT,
    IF,
    EQUALS,
    AND,
    OR,
    NOT,
    CONDITION,
    SPLIT,
    BASE64,
    CIDR,
    IMPORT_VALUE,
    FIND_IN_MAP,
    TRANSFORM,
    GET_AZS,
];

/// Positional field names for an intrinsic's argument list.
///
/// Used when matching recorded attribute-reference paths: argument `N`
/// of a function is addressed by the `N`th name.
pub fn positional_fields(key: &str) -> &'static [&'static str] {
    match key {
        REF => &["LogicalName"],
        GET_ATT => &["LogicalName", "AttributeName"],
        SUB => &["String", "Variables"],
        JOIN => &["Delimiter", "Values"],
        SELECT => &["Index", "List"],
        IF => &["Condition", "ValueIfTrue", "ValueIfFalse"],
        EQUALS => &["Value1", "Value2"],
        AND | OR => &["Conditions"],
        NOT => &["Condition"],
        CONDITION => &["Name"],
        SPLIT => &["Delimiter", "Source"],
        BASE64 => &["Value"],
        CIDR => &["IpBlock", "Count", "CidrBits"],
        IMPORT_VALUE => &["Name"],
        FIND_IN_MAP => &["MapName", "TopLevelKey", "SecondLevelKey"],
        TRANSFORM => &["Name", "Parameters"],
        GET_AZS => &["Region"],
        _ => &[],
    }
}

/// True if `key` is one of the recognized intrinsic wire keys.
pub fn is_intrinsic_key(key: &str) -> bool {
    KNOWN_KEYS.contains(&key)
}

/// "The named attribute of resource X".
///
/// A reference with an empty resource name is a placeholder left by
/// generic value serialization; it must be repaired before a document is
/// emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttrRef {
    pub resource: String,
    pub attribute: String,
}

impl AttrRef {
    pub fn new(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    /// A placeholder that knows its attribute but not its resource.
    pub fn unresolved(attribute: impl Into<String>) -> Self {
        Self {
            resource: String::new(),
            attribute: attribute.into(),
        }
    }

    /// True only for the default value (both fields empty).
    pub fn is_zero(&self) -> bool {
        self.resource.is_empty() && self.attribute.is_empty()
    }

    /// True while the owning resource is unknown.
    pub fn is_unresolved(&self) -> bool {
        self.resource.is_empty()
    }

    /// The wire form, `{"Fn::GetAtt": [resource, attribute]}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ GET_ATT: [self.resource, self.attribute] })
    }
}

/// A tagged intrinsic function value.
#[derive(Debug, Clone, PartialEq)]
pub enum Intrinsic {
    Ref(String),
    GetAtt(AttrRef),
    /// `variables` is empty for the short (string-only) form.
    Sub {
        template: String,
        variables: IndexMap<String, Value>,
    },
    Join {
        delimiter: String,
        values: Value,
    },
    Select {
        index: Value,
        list: Value,
    },
    If {
        condition: String,
        if_true: Value,
        if_false: Value,
    },
    Equals(Value, Value),
    And(Vec<Value>),
    Or(Vec<Value>),
    Not(Value),
    Condition(String),
    Split {
        delimiter: String,
        source: Value,
    },
    Base64(Value),
    Cidr {
        ip_block: Value,
        count: Value,
        cidr_bits: Value,
    },
    ImportValue(Value),
    FindInMap {
        map_name: Value,
        top_key: Value,
        second_key: Value,
    },
    Transform {
        name: String,
        parameters: IndexMap<String, Value>,
    },
    GetAZs(Value),
    /// An intrinsic-shaped object kept verbatim: an unrecognized key, or a
    /// `Fn::GetAtt` whose attribute name is itself computed.
    Unknown {
        key: String,
        args: serde_json::Value,
    },
}

/// How an intrinsic argument is addressed relative to the intrinsic itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKey {
    /// A positional field, e.g. `Values` of a join.
    Field(&'static str),
    /// An element of a list-valued positional field, e.g. `Conditions[1]`.
    Indexed(&'static str, usize),
    /// An entry of a map-valued positional field, e.g. `Variables.Name`.
    Keyed(&'static str, String),
}

impl ArgKey {
    /// Extend `base` with this argument's address.
    pub fn extend(&self, base: &FieldPath) -> FieldPath {
        match self {
            ArgKey::Field(f) => base.key(*f),
            ArgKey::Indexed(f, i) => base.key(*f).index(*i),
            ArgKey::Keyed(f, k) => base.key(*f).key(k.clone()),
        }
    }
}

impl Intrinsic {
    /// The wire key naming this function.
    pub fn key(&self) -> &str {
        match self {
            Intrinsic::Ref(_) => REF,
            Intrinsic::GetAtt(_) => GET_ATT,
            Intrinsic::Sub { .. } => SUB,
            Intrinsic::Join { .. } => JOIN,
            Intrinsic::Select { .. } => SELECT,
            Intrinsic::If { .. } => IF,
            Intrinsic::Equals(..) => EQUALS,
            Intrinsic::And(_) => AND,
            Intrinsic::Or(_) => OR,
            Intrinsic::Not(_) => NOT,
            Intrinsic::Condition(_) => CONDITION,
            Intrinsic::Split { .. } => SPLIT,
            Intrinsic::Base64(_) => BASE64,
            Intrinsic::Cidr { .. } => CIDR,
            Intrinsic::ImportValue(_) => IMPORT_VALUE,
            Intrinsic::FindInMap { .. } => FIND_IN_MAP,
            Intrinsic::Transform { .. } => TRANSFORM,
            Intrinsic::GetAZs(_) => GET_AZS,
            Intrinsic::Unknown { key, .. } => key.as_str(),
        }
    }

    /// Short function name without the `Fn::` prefix (`GetAtt`, `Sub`, ...).
    pub fn short_name(&self) -> &str {
        let key = self.key();
        key.strip_prefix("Fn::").unwrap_or(key)
    }

    /// Arguments that hold nested values, addressed by positional field.
    ///
    /// String-only arguments (reference names, delimiters, templates) are
    /// not values and are not returned.
    pub fn value_args(&self) -> Vec<(ArgKey, &Value)> {
        use ArgKey::*;
        match self {
            Intrinsic::Ref(_)
            | Intrinsic::GetAtt(_)
            | Intrinsic::Condition(_)
            | Intrinsic::Unknown { .. } => Vec::new(),
            Intrinsic::Sub { variables, .. } => variables
                .iter()
                .map(|(k, v)| (Keyed("Variables", k.clone()), v))
                .collect(),
            Intrinsic::Join { values, .. } => vec![(Field("Values"), values)],
            Intrinsic::Select { index, list } => {
                vec![(Field("Index"), index), (Field("List"), list)]
            }
            Intrinsic::If {
                if_true, if_false, ..
            } => vec![
                (Field("ValueIfTrue"), if_true),
                (Field("ValueIfFalse"), if_false),
            ],
            Intrinsic::Equals(a, b) => vec![(Field("Value1"), a), (Field("Value2"), b)],
            Intrinsic::And(items) | Intrinsic::Or(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (Indexed("Conditions", i), v))
                .collect(),
            Intrinsic::Not(v) => vec![(Field("Condition"), v)],
            Intrinsic::Split { source, .. } => vec![(Field("Source"), source)],
            Intrinsic::Base64(v) => vec![(Field("Value"), v)],
            Intrinsic::Cidr {
                ip_block,
                count,
                cidr_bits,
            } => vec![
                (Field("IpBlock"), ip_block),
                (Field("Count"), count),
                (Field("CidrBits"), cidr_bits),
            ],
            Intrinsic::ImportValue(v) => vec![(Field("Name"), v)],
            Intrinsic::FindInMap {
                map_name,
                top_key,
                second_key,
            } => vec![
                (Field("MapName"), map_name),
                (Field("TopLevelKey"), top_key),
                (Field("SecondLevelKey"), second_key),
            ],
            Intrinsic::Transform { parameters, .. } => parameters
                .iter()
                .map(|(k, v)| (Keyed("Parameters", k.clone()), v))
                .collect(),
            Intrinsic::GetAZs(v) => vec![(Field("Region"), v)],
        }
    }

    /// Mutable counterpart of [`Intrinsic::value_args`].
    pub fn value_args_mut(&mut self) -> Vec<(ArgKey, &mut Value)> {
        use ArgKey::*;
        match self {
            Intrinsic::Ref(_)
            | Intrinsic::GetAtt(_)
            | Intrinsic::Condition(_)
            | Intrinsic::Unknown { .. } => Vec::new(),
            Intrinsic::Sub { variables, .. } => variables
                .iter_mut()
                .map(|(k, v)| (Keyed("Variables", k.clone()), v))
                .collect(),
            Intrinsic::Join { values, .. } => vec![(Field("Values"), values)],
            Intrinsic::Select { index, list } => {
                vec![(Field("Index"), index), (Field("List"), list)]
            }
            Intrinsic::If {
                if_true, if_false, ..
            } => vec![
                (Field("ValueIfTrue"), if_true),
                (Field("ValueIfFalse"), if_false),
            ],
            Intrinsic::Equals(a, b) => vec![(Field("Value1"), a), (Field("Value2"), b)],
            Intrinsic::And(items) | Intrinsic::Or(items) => items
                .iter_mut()
                .enumerate()
                .map(|(i, v)| (Indexed("Conditions", i), v))
                .collect(),
            Intrinsic::Not(v) => vec![(Field("Condition"), v)],
            Intrinsic::Split { source, .. } => vec![(Field("Source"), source)],
            Intrinsic::Base64(v) => vec![(Field("Value"), v)],
            Intrinsic::Cidr {
                ip_block,
                count,
                cidr_bits,
            } => vec![
                (Field("IpBlock"), ip_block),
                (Field("Count"), count),
                (Field("CidrBits"), cidr_bits),
            ],
            Intrinsic::ImportValue(v) => vec![(Field("Name"), v)],
            Intrinsic::FindInMap {
                map_name,
                top_key,
                second_key,
            } => vec![
                (Field("MapName"), map_name),
                (Field("TopLevelKey"), top_key),
                (Field("SecondLevelKey"), second_key),
            ],
            Intrinsic::Transform { parameters, .. } => parameters
                .iter_mut()
                .map(|(k, v)| (Keyed("Parameters", k.clone()), v))
                .collect(),
            Intrinsic::GetAZs(v) => vec![(Field("Region"), v)],
        }
    }

    /// Logical names this intrinsic points at directly (`Ref`, `GetAtt`).
    pub fn target(&self) -> Option<&str> {
        match self {
            Intrinsic::Ref(name) => Some(name),
            Intrinsic::GetAtt(attr) if !attr.resource.is_empty() => Some(&attr.resource),
            _ => None,
        }
    }

    /// True for functions whose result is a list on the wire.
    pub fn yields_list(&self) -> bool {
        matches!(
            self,
            Intrinsic::Split { .. } | Intrinsic::GetAZs(_) | Intrinsic::Cidr { .. }
        )
    }

    /// `${Name}` and `${Res.Attr}` placeholders of a substitution template.
    ///
    /// Literal `${!Escaped}` sequences are skipped.
    pub fn sub_placeholders(template: &str) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = template;
        while let Some(start) = rest.find("${") {
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                break;
            };
            let inner = &after[..end];
            if !inner.starts_with('!') && !inner.is_empty() {
                names.push(inner.trim());
            }
            rest = &after[end + 1..];
        }
        names
    }
}
