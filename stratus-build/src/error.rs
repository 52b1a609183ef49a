use std::{fmt, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::SourceLocation;

/// Result type for build operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// One member of a dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleNode {
    pub name: String,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for CycleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({})", self.name, location),
            None => f.write_str(&self.name),
        }
    }
}

/// A dependency cycle, listed in edge order without repeating the start.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("dependency cycle detected: {}", render_cycle(.path))]
#[diagnostic(
    code(stratus::cycle),
    help("break the cycle by removing a reference or using an explicit attribute reference")
)]
pub struct CycleError {
    pub path: Vec<CycleNode>,
}

impl CycleError {
    /// Names along the cycle.
    pub fn names(&self) -> Vec<&str> {
        self.path.iter().map(|n| n.name.as_str()).collect()
    }
}

fn render_cycle(path: &[CycleNode]) -> String {
    let mut parts: Vec<String> = path.iter().map(ToString::to_string).collect();
    if let Some(first) = path.first() {
        parts.push(first.name.clone());
    }
    parts.join(" -> ")
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cycle(CycleError),

    #[error("unknown resource type '{declared_type}' for '{name}'{}", at(.location))]
    #[diagnostic(
        code(stratus::unknown_type),
        help("declared types are written '<namespace>.<Kind>', e.g. 's3.Bucket'")
    )]
    UnknownType {
        name: String,
        declared_type: String,
        location: Option<SourceLocation>,
    },

    #[error("invalid logical name '{name}' in {section}: {reason}{}", at(.location))]
    #[diagnostic(
        code(stratus::invalid_name),
        help("logical names must be non-empty and ASCII alphanumeric")
    )]
    InvalidName {
        name: String,
        section: &'static str,
        reason: &'static str,
        location: Option<SourceLocation>,
    },

    #[error("logical name '{name}' is declared in both {first} and {second}{}", at(.location))]
    #[diagnostic(
        code(stratus::duplicate_name),
        help("logical names are shared by every template section and must be unique")
    )]
    DuplicateName {
        name: String,
        first: &'static str,
        second: &'static str,
        location: Option<SourceLocation>,
    },

    #[error("unresolved attribute reference '{attribute}' at '{path}' in '{name}'")]
    #[diagnostic(
        code(stratus::unresolved_reference),
        help("the declaration graph has no recorded usage for this field")
    )]
    UnresolvedReference {
        name: String,
        path: String,
        attribute: String,
    },

    #[error("cannot serialize '{name}': {message}")]
    #[diagnostic(code(stratus::serialization))]
    Serialization { name: String, message: String },

    #[error("failed to read '{path}'")]
    #[diagnostic(code(stratus::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid declaration graph '{path}'")]
    #[diagnostic(code(stratus::graph))]
    Graph {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn at(location: &Option<SourceLocation>) -> String {
    location
        .as_ref()
        .map(|l| format!(" at {}", l))
        .unwrap_or_default()
}

impl Error {
    pub fn serialization(name: impl Into<String>, message: impl Into<String>) -> Box<Self> {
        Box::new(Error::Serialization {
            name: name.into(),
            message: message.into(),
        })
    }
}

impl From<CycleError> for Box<Error> {
    fn from(err: CycleError) -> Self {
        Box::new(Error::Cycle(err))
    }
}
