//! The declaration graph handed to the builder.
//!
//! Extracting declarations from user code happens elsewhere; this module
//! only describes the shape of its output and how it is obtained.

use std::{fmt, path::PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stratus_ir::{FieldPath, Value};

use crate::{Error, Result};

/// Where a declaration was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One attribute access recorded inside a declaration's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrRefUsage {
    pub resource: String,
    pub attribute: String,
    /// Dotted path inside the declaring value, e.g. `Policies[0].Resource`.
    #[serde(default)]
    pub field_path: String,
}

impl AttrRefUsage {
    pub fn new(
        resource: impl Into<String>,
        attribute: impl Into<String>,
        field_path: impl Into<String>,
    ) -> Self {
        Self {
            resource: resource.into(),
            attribute: attribute.into(),
            field_path: field_path.into(),
        }
    }

    pub fn path(&self) -> FieldPath {
        FieldPath::parse(&self.field_path)
    }
}

/// A resource declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredResource {
    pub name: String,
    /// Declared type such as `s3.Bucket`.
    #[serde(rename = "type")]
    pub declared_type: String,
    #[serde(default)]
    pub location: Option<SourceLocation>,
    /// Ordering edges: every declaration this one refers to.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Explicit `DependsOn` entries, emitted verbatim.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub attr_refs: Vec<AttrRefUsage>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub deletion_policy: Option<String>,
    #[serde(default)]
    pub update_replace_policy: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl DiscoveredResource {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            location: None,
            dependencies: Vec::new(),
            depends_on: Vec::new(),
            attr_refs: Vec::new(),
            condition: None,
            deletion_policy: None,
            update_replace_policy: None,
            metadata: None,
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn depends(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    pub fn attr_ref(mut self, usage: AttrRefUsage) -> Self {
        self.attr_refs.push(usage);
        self
    }
}

/// Attribute usages of a non-resource declaration, plus its forwarding map.
///
/// `var_refs` maps a field of this declaration's value to the name of
/// another declaration whose value is used there verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarAttrRefInfo {
    #[serde(default)]
    pub attr_refs: Vec<AttrRefUsage>,
    #[serde(default)]
    pub var_refs: IndexMap<String, String>,
}

/// A parameter, mapping or condition declaration; its value lives in
/// [`Declarations::values`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredItem {
    pub name: String,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl DiscoveredItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
        }
    }
}

/// An output declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredOutput {
    pub name: String,
    #[serde(default)]
    pub location: Option<SourceLocation>,
    #[serde(default)]
    pub description: Option<String>,
    pub value: Value,
    /// Inline export name.
    #[serde(default)]
    pub export_name: Option<Value>,
    /// Structured export, `{"Name": ...}`.
    #[serde(default)]
    pub export: Option<Value>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub attr_refs: Vec<AttrRefUsage>,
}

/// Everything a build consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Declarations {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resources: Vec<DiscoveredResource>,
    #[serde(default)]
    pub vars: IndexMap<String, VarAttrRefInfo>,
    #[serde(default)]
    pub parameters: Vec<DiscoveredItem>,
    #[serde(default)]
    pub mappings: Vec<DiscoveredItem>,
    #[serde(default)]
    pub conditions: Vec<DiscoveredItem>,
    #[serde(default)]
    pub outputs: Vec<DiscoveredOutput>,
    /// Realized value of every named declaration.
    #[serde(default)]
    pub values: IndexMap<String, Value>,
}

/// Source of a declaration graph.
pub trait DeclarationProvider {
    fn declarations(&self) -> Result<Declarations>;
}

/// Reads a graph file: the JSON form of [`Declarations`].
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DeclarationProvider for JsonFileProvider {
    fn declarations(&self) -> Result<Declarations> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            Box::new(Error::Io {
                path: self.path.clone(),
                source,
            })
        })?;
        let declarations: Declarations = serde_json::from_str(&content).map_err(|source| {
            Box::new(Error::Graph {
                path: self.path.clone(),
                source,
            })
        })?;
        tracing::debug!(
            path = %self.path.display(),
            resources = declarations.resources.len(),
            "loaded declaration graph"
        );
        Ok(declarations)
    }
}

impl DeclarationProvider for Declarations {
    fn declarations(&self) -> Result<Declarations> {
        Ok(self.clone())
    }
}
