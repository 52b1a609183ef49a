//! Text building blocks for generated Rust source.

mod builder;
mod fragment;
mod rust_file;

pub use builder::{CodeBuilder, Indent};
pub use fragment::{CodeFragment, Renderable};
pub use rust_file::{RawCode, RustFile, Use};
