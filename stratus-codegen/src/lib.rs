//! Rust declaration generation for parsed templates.
//!
//! A template is lowered into `pub static` declarations, one per resource,
//! parameter, mapping, condition and output, plus one per typed nested
//! object. Direct references between statics are kept where they cannot
//! deadlock initialization and the result is grouped into category files.
//!
//! # Module Organization
//!
//! - [`code`] - Source building blocks (CodeBuilder, CodeFragment, RustFile)
//! - [`schema`] - Property shapes (SchemaLookup, InferredSchema, SpecSchema)
//! - [`naming`] - Identifier sanitizing and discrimination
//! - [`expr`] - Initializer expressions and their Rust text

pub mod code;
mod cycles;
mod error;
pub mod expr;
mod generator;
mod lower;
pub mod naming;
pub mod schema;
mod state;

pub use cycles::BrokenEdge;
pub use error::{Error, Result};
pub use generator::{DEFAULT_PACKAGE, Rendered, RustGenerator};
pub use lower::{FileGroup, RESERVED_NAMES};
pub use schema::{InferredSchema, SchemaLookup, Shape, SpecSchema, TypeContext};
pub use state::{ImportReport, ResourceState};
