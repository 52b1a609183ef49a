use std::{collections::HashMap, path::Path};

use serde::Deserialize;
use stratus_ir::Value;

use super::{SchemaLookup, Shape, TypeContext};
use crate::{Error, Result};

/// Property shapes from the published resource specification document
/// (`ResourceTypes` and `PropertyTypes`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpecSchema {
    #[serde(default)]
    resource_types: HashMap<String, TypeSpec>,
    #[serde(default)]
    property_types: HashMap<String, TypeSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TypeSpec {
    #[serde(default)]
    properties: HashMap<String, PropertySpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PropertySpec {
    primitive_type: Option<String>,
    primitive_item_type: Option<String>,
    #[serde(rename = "Type")]
    type_name: Option<String>,
    item_type: Option<String>,
}

impl SpecSchema {
    pub fn from_json(json: &str, path: impl AsRef<Path>) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| {
            Box::new(Error::SchemaParse {
                path: path.as_ref().to_path_buf(),
                source,
            })
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            Box::new(Error::SchemaIo {
                path: path.to_path_buf(),
                source,
            })
        })?;
        let schema = Self::from_json(&content, path)?;
        tracing::debug!(
            path = %path.display(),
            resource_types = schema.resource_types.len(),
            property_types = schema.property_types.len(),
            "loaded resource specification"
        );
        Ok(schema)
    }

    /// Property type key: `AWS::S3::Bucket.VersioningConfiguration`, or a
    /// shared type such as `Tag`.
    fn property_type_key(&self, resource_type: &str, name: &str) -> Option<String> {
        let scoped = format!("{}.{}", resource_type, name);
        if self.property_types.contains_key(&scoped) {
            Some(scoped)
        } else if self.property_types.contains_key(name) {
            Some(name.to_string())
        } else {
            None
        }
    }

    fn declaring_type(&self, context: &TypeContext) -> Option<&TypeSpec> {
        match &context.property_type {
            None => self.resource_types.get(&context.resource_type),
            Some(name) => self
                .property_type_key(&context.resource_type, name)
                .and_then(|key| self.property_types.get(&key)),
        }
    }

    fn check_nested(&self, context: &TypeContext, property: &str, name: &str) -> Result<()> {
        if self.property_type_key(&context.resource_type, name).is_some() {
            return Ok(());
        }
        Err(Box::new(Error::MissingNestedType {
            resource_type: context.resource_type.clone(),
            property: property.to_string(),
            type_name: name.to_string(),
        }))
    }
}

impl PropertySpec {
    fn shape(&self) -> Shape {
        match self.type_name.as_deref() {
            Some("List") => Shape::list(self.item_shape()),
            Some("Map") => Shape::Map(Box::new(self.item_shape())),
            Some(name) => Shape::Nested(name.to_string()),
            None => primitive(self.primitive_type.as_deref()),
        }
    }

    fn item_shape(&self) -> Shape {
        match &self.item_type {
            Some(name) => Shape::Nested(name.clone()),
            None => primitive(self.primitive_item_type.as_deref()),
        }
    }
}

fn primitive(name: Option<&str>) -> Shape {
    match name {
        Some("Json") => Shape::Json,
        _ => Shape::Scalar,
    }
}

impl SchemaLookup for SpecSchema {
    fn supports(&self, resource_type: &str) -> bool {
        self.resource_types.contains_key(resource_type)
    }

    fn property(&self, context: &TypeContext, property: &str, _value: &Value) -> Result<Shape> {
        let Some(spec) = self
            .declaring_type(context)
            .and_then(|t| t.properties.get(property))
        else {
            tracing::debug!(
                resource_type = %context.resource_type,
                property,
                "property not in specification, treating as JSON"
            );
            return Ok(Shape::Json);
        };

        let shape = spec.shape();
        match &shape {
            Shape::Nested(name) => self.check_nested(context, property, name)?,
            Shape::List(item) | Shape::Map(item) => {
                if let Shape::Nested(name) = item.as_ref() {
                    self.check_nested(context, property, name)?;
                }
            }
            _ => {}
        }
        Ok(shape)
    }
}
