//! The tagged value tree.
//!
//! Property bags, parameter defaults, outputs and intrinsic arguments are
//! all [`Value`]s. Intrinsics are a first-class variant rather than
//! single-key objects, so consumers match on them instead of inspecting
//! object shapes.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{AttrRef, FieldPath, Intrinsic};

/// A JSON-like value that may contain intrinsic functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    Intrinsic(Box<Intrinsic>),
}

/// Control returned by a [`Value::walk_mut`] callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Descend into the node's children.
    Continue,
    /// Leave the node's children untouched.
    Skip,
}

impl Value {
    /// Shorthand for an object value from `(key, value)` pairs.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn intrinsic(intrinsic: Intrinsic) -> Self {
        Value::Intrinsic(Box::new(intrinsic))
    }

    /// `{"Ref": name}`.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::intrinsic(Intrinsic::Ref(name.into()))
    }

    /// `{"Fn::GetAtt": [resource, attribute]}`.
    pub fn get_att(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::intrinsic(Intrinsic::GetAtt(AttrRef::new(resource, attribute)))
    }

    /// `{"Fn::Sub": template}`.
    pub fn sub(template: impl Into<String>) -> Self {
        Self::intrinsic(Intrinsic::Sub {
            template: template.into(),
            variables: IndexMap::new(),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::String(s) if s == "true" => Some(true),
            Value::String(s) if s == "false" => Some(false),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_intrinsic(&self) -> Option<&Intrinsic> {
        match self {
            Value::Intrinsic(i) => Some(i),
            _ => None,
        }
    }

    /// Look up a key when this value is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|m| m.get(key))
    }

    /// Follow a field path from this value.
    ///
    /// Intrinsic arguments are addressed by their positional field names.
    pub fn pointer(&self, path: &FieldPath) -> Option<&Value> {
        use crate::Segment;

        let mut current = self;
        let mut segments = path.segments().iter().peekable();
        while let Some(segment) = segments.next() {
            current = match (current, segment) {
                (Value::Object(map), Segment::Key(k)) => map.get(k)?,
                (Value::Array(items), Segment::Index(i)) => items.get(*i)?,
                (Value::Intrinsic(intrinsic), Segment::Key(field)) => {
                    let next_index = match segments.peek() {
                        Some(Segment::Index(i)) => Some(*i),
                        _ => None,
                    };
                    let next_key = match segments.peek() {
                        Some(Segment::Key(k)) => Some(k.as_str()),
                        _ => None,
                    };
                    let mut found = None;
                    let mut consumed_next = false;
                    for (arg, value) in intrinsic.value_args() {
                        match arg {
                            crate::ArgKey::Field(f) if f == field.as_str() => {
                                found = Some(value);
                                break;
                            }
                            crate::ArgKey::Indexed(f, i)
                                if f == field.as_str() && Some(i) == next_index => {
                                found = Some(value);
                                consumed_next = true;
                                break;
                            }
                            crate::ArgKey::Keyed(f, ref k)
                                if f == field.as_str() && Some(k.as_str()) == next_key =>
                            {
                                found = Some(value);
                                consumed_next = true;
                                break;
                            }
                            _ => {}
                        }
                    }
                    if consumed_next {
                        segments.next();
                    }
                    found?
                }
                _ => return None,
            };
        }
        Some(current)
    }

    /// Visit every node in pre-order with its path relative to `base`.
    pub fn walk<'a>(&'a self, base: &FieldPath, f: &mut impl FnMut(&FieldPath, &'a Value)) {
        f(base, self);
        match self {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    item.walk(&base.index(i), f);
                }
            }
            Value::Object(map) => {
                for (k, v) in map {
                    v.walk(&base.key(k.clone()), f);
                }
            }
            Value::Intrinsic(intrinsic) => {
                for (arg, v) in intrinsic.value_args() {
                    v.walk(&arg.extend(base), f);
                }
            }
            _ => {}
        }
    }

    /// Visit every node in pre-order, allowing in-place rewrites.
    ///
    /// The callback runs before a node's children are visited; returning
    /// [`Walk::Skip`] leaves the children alone.
    pub fn walk_mut<E>(
        &mut self,
        base: &FieldPath,
        f: &mut impl FnMut(&FieldPath, &mut Value) -> Result<Walk, E>,
    ) -> Result<(), E> {
        if f(base, self)? == Walk::Skip {
            return Ok(());
        }
        match self {
            Value::Array(items) => {
                for (i, item) in items.iter_mut().enumerate() {
                    item.walk_mut(&base.index(i), f)?;
                }
            }
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let path = base.key(k.clone());
                    v.walk_mut(&path, f)?;
                }
            }
            Value::Intrinsic(intrinsic) => {
                for (arg, v) in intrinsic.value_args_mut() {
                    v.walk_mut(&arg.extend(base), f)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Every `Ref`/`GetAtt` target and `${...}` substitution name in the tree.
    ///
    /// Substitution names of the form `Res.Attr` contribute `Res`.
    pub fn referenced_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.walk(&FieldPath::root(), &mut |_, v| {
            let Value::Intrinsic(intrinsic) = v else {
                return;
            };
            if let Some(target) = intrinsic.target() {
                names.push(target.to_string());
            }
            if let Intrinsic::Sub {
                template,
                variables,
            } = intrinsic.as_ref()
            {
                for name in Intrinsic::sub_placeholders(template) {
                    let head = name.split('.').next().unwrap_or(name);
                    if !variables.contains_key(head) {
                        names.push(head.to_string());
                    }
                }
            }
        });
        names
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<Intrinsic> for Value {
    fn from(i: Intrinsic) -> Self {
        Value::intrinsic(i)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Value::from_json(&json).map_err(serde::de::Error::custom)
    }
}
