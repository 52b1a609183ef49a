//! Core utilities for the stratus template compiler.
//!
//! This crate holds the pieces shared by both pipeline directions: the
//! service type registry, the category table used to group generated
//! code, case conversion, and generated-file writing.

mod category;
mod codegen;
mod file;
pub mod registry;
mod utils;

pub use category::Category;
// Code generation
pub use codegen::{GenerateResult, LanguageCodegen};
// File operations
pub use file::{File, GENERATED_HEADER, Overwrite, WriteResult};
// Registry
pub use registry::{DeclaredType, Namespace, declared_for, is_serverless, resolve};
// String utilities
pub use utils::{to_pascal_case, to_snake_case};
