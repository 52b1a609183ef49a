//! Template documents: parsing JSON or YAML text into the IR and emitting
//! the IR back out.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod emit;
mod error;
mod implicit;
mod parse;
mod validate;
mod yaml;

pub use emit::{Format, emit, to_json_string, to_yaml_string};
pub use error::{Error, Result, SourceContext};
pub use implicit::{COMPANIONS, IMPLICIT_APIS, PSEUDO_PARAMETERS, companions, implicit_resources};
pub use parse::{ParsedTemplate, UndefinedReference, parse_file, parse_str, parse_str_with_filename};
pub use stratus_ir::logical_name_problem;
