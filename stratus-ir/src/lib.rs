//! Intermediate representation for the stratus template compiler.
//!
//! Both pipeline directions meet here:
//!
//! ```text
//! declarations + values → stratus-build → Template → JSON/YAML
//! JSON/YAML → stratus-template → Template → stratus-codegen → Rust
//! ```
//!
//! Intrinsic functions are a closed, typed set ([`Intrinsic`]) embedded in
//! the generic [`Value`] tree. Unknown `Fn::` keys survive as
//! [`Intrinsic::Unknown`] so they can be written back verbatim.

pub mod intrinsic;
mod path;
mod template;
mod value;
mod wire;

pub use intrinsic::{ArgKey, AttrRef, Intrinsic, is_intrinsic_key, positional_fields};
pub use path::{FieldPath, Segment};
pub use template::{
    Export, FORMAT_VERSION, Output, Parameter, ResourceDef, SERVERLESS_TRANSFORM, Template,
    logical_name_problem,
};
pub use value::{Value, Walk};
pub use wire::{Decoder, MAX_INTRINSIC_DEPTH, WireError};
