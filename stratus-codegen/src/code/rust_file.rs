//! Structured Rust source files: inner attributes, grouped imports and a
//! body of items separated by blank lines.

use super::{CodeBuilder, CodeFragment, Renderable};

/// A Rust use statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Use {
    module: String,
    symbols: Vec<String>,
}

impl Use {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            symbols: Vec::new(),
        }
    }

    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbols.push(symbol.into());
        self
    }

    pub fn symbols(mut self, symbols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.symbols.extend(symbols.into_iter().map(Into::into));
        self
    }

    fn format(&self) -> String {
        match self.symbols.as_slice() {
            [] => format!("use {};", self.module),
            [one] => format!("use {}::{};", self.module, one),
            many => format!("use {}::{{{}}};", self.module, many.join(", ")),
        }
    }

    /// std imports sort before external crates, which sort before
    /// crate-relative paths.
    fn group(&self) -> u8 {
        let root = self.module.split("::").next().unwrap_or_default();
        match root {
            "std" | "core" | "alloc" => 0,
            "crate" | "super" | "self" => 2,
            _ => 1,
        }
    }
}

impl Renderable for Use {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        vec![CodeFragment::Line(self.format())]
    }
}

/// A raw code fragment, one [`CodeFragment::Line`] per source line.
#[derive(Debug, Clone)]
pub struct RawCode(String);

impl RawCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl Renderable for RawCode {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        self.0.lines().map(CodeFragment::line).collect()
    }
}

/// A generated Rust file.
///
/// ```
/// use stratus_codegen::code::{RawCode, RustFile, Use};
///
/// let text = RustFile::new()
///     .use_stmt(Use::new("std::sync").symbol("LazyLock"))
///     .add(RawCode::new("pub static X: LazyLock<u8> = LazyLock::new(|| 1);"))
///     .render();
/// assert!(text.starts_with("use std::sync::LazyLock;\n\npub static X"));
/// ```
#[derive(Default)]
pub struct RustFile {
    attributes: Vec<String>,
    uses: Vec<Use>,
    body: Vec<Vec<CodeFragment>>,
}

impl RustFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an inner attribute such as `allow(non_upper_case_globals)`.
    pub fn inner_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn use_stmt(mut self, use_stmt: Use) -> Self {
        if !self.uses.contains(&use_stmt) {
            self.uses.push(use_stmt);
        }
        self
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add<R: Renderable>(mut self, node: R) -> Self {
        self.body.push(node.to_fragments());
        self
    }

    pub fn add_all<R: Renderable>(mut self, nodes: impl IntoIterator<Item = R>) -> Self {
        for node in nodes {
            self.body.push(node.to_fragments());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.uses.is_empty() && self.body.is_empty()
    }

    pub fn render(&self) -> String {
        let mut builder = CodeBuilder::rust();
        let mut sections = 0;

        if !self.attributes.is_empty() {
            for attribute in &self.attributes {
                builder.push_line(&format!("#![{}]", attribute));
            }
            sections += 1;
        }

        let mut last_group = None;
        let mut uses: Vec<&Use> = self.uses.iter().collect();
        uses.sort_by_key(|u| u.group());
        for use_stmt in uses {
            if last_group != Some(use_stmt.group()) && (sections > 0 || last_group.is_some()) {
                builder.push_blank();
            }
            last_group = Some(use_stmt.group());
            builder.emit(use_stmt);
        }
        if last_group.is_some() {
            sections += 1;
        }

        for fragments in &self.body {
            if sections > 0 {
                builder.push_blank();
            }
            for fragment in fragments {
                builder.apply_fragment(fragment.clone());
            }
            sections += 1;
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file() {
        let file = RustFile::new();
        assert!(file.is_empty());
        assert_eq!(file.render(), "");
    }

    #[test]
    fn test_use_forms() {
        assert_eq!(Use::new("serde_json").format(), "use serde_json;");
        assert_eq!(Use::new("serde_json").symbol("json").format(), "use serde_json::json;");
        assert_eq!(
            Use::new("lib").symbols(["a", "b"]).format(),
            "use lib::{a, b};"
        );
    }

    #[test]
    fn test_layout() {
        let text = RustFile::new()
            .inner_attribute("allow(unused_imports)")
            .use_stmt(Use::new("super::*"))
            .use_stmt(Use::new("serde_json").symbol("json"))
            .use_stmt(Use::new("std::sync").symbol("LazyLock"))
            .use_stmt(Use::new("std::sync").symbol("LazyLock"))
            .add(RawCode::new("pub static A: u8 = 1;"))
            .add(RawCode::new("pub static B: u8 = 2;"))
            .render();
        assert_eq!(
            text,
            "#![allow(unused_imports)]\n\
             \n\
             use std::sync::LazyLock;\n\
             \n\
             use serde_json::json;\n\
             \n\
             use super::*;\n\
             \n\
             pub static A: u8 = 1;\n\
             \n\
             pub static B: u8 = 2;\n"
        );
    }
}
