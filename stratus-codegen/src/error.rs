use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result type for generation (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("logical name '{name}' has no characters usable in an identifier")]
    #[diagnostic(code(stratus::invalid_identifier))]
    InvalidIdentifier { name: String },

    #[error("property type '{type_name}' used by {resource_type} property '{property}' is not in the schema")]
    #[diagnostic(
        code(stratus::missing_nested_type),
        help("the resource specification may be out of date")
    )]
    MissingNestedType {
        resource_type: String,
        property: String,
        type_name: String,
    },

    #[error("failed to read schema '{path}'")]
    #[diagnostic(code(stratus::io))]
    SchemaIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema '{path}'")]
    #[diagnostic(code(stratus::schema))]
    SchemaParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
