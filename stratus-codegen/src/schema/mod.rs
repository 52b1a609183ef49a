//! Property shapes: which properties are lists, nested types or free-form
//! JSON.

mod inferred;
mod spec;

pub use inferred::InferredSchema;
pub use spec::SpecSchema;
use stratus_ir::Value;

use crate::Result;

/// Expected shape of a property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// String, number, boolean or timestamp.
    Scalar,
    /// Free-form JSON document.
    Json,
    /// A named property type of the enclosing resource type.
    Nested(String),
    List(Box<Shape>),
    Map(Box<Shape>),
}

impl Shape {
    pub fn list(item: Shape) -> Self {
        Shape::List(Box::new(item))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Shape::List(_))
    }
}

/// Where a property is declared: directly on a resource type, or on one of
/// its nested property types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeContext {
    pub resource_type: String,
    pub property_type: Option<String>,
}

impl TypeContext {
    pub fn resource(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            property_type: None,
        }
    }

    /// Context for the properties of nested type `name`.
    pub fn nested(&self, name: impl Into<String>) -> Self {
        Self {
            resource_type: self.resource_type.clone(),
            property_type: Some(name.into()),
        }
    }
}

/// Source of property shapes for code generation.
pub trait SchemaLookup {
    /// False for resource types the schema knows nothing about; those are
    /// emitted as untyped placeholders.
    fn supports(&self, resource_type: &str) -> bool;

    /// Shape of `property` within `context`. `value` is the template value
    /// at that position, for schemas that infer from data.
    fn property(&self, context: &TypeContext, property: &str, value: &Value) -> Result<Shape>;
}
