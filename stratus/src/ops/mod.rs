//! Core operations.
//!
//! This module contains the business logic for stratus commands,
//! separated from CLI argument parsing and output rendering.

pub mod build;
pub mod check;
pub mod import;

pub use build::{BuildOptions, build};
pub use check::check;
pub use import::{ImportOptions, import};
