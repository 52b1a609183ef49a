//! Rust identifiers for logical names and property names.

use std::collections::HashSet;

use stratus_core::{to_pascal_case, to_snake_case};

/// Rust keywords that cannot be used as plain identifiers.
pub const RUST_KEYWORDS: &[&str] = &[
    // Strict keywords
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while",
    // Reserved keywords
    "abstract", "become", "box", "do", "final", "gen", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
    // Weak keywords
    "union",
];

/// Keywords that cannot be written as raw identifiers either.
const NON_RAW: &[&str] = &["self", "Self", "super", "crate"];

pub fn is_rust_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name)
}

/// Identifier for a top-level declaration.
///
/// Punctuation is dropped as a word break, a leading digit gets an `R`
/// prefix and the first letter is capitalized. Returns `None` when nothing
/// identifier-like remains.
pub fn declaration_name(logical: &str) -> Option<String> {
    let spaced: String = logical
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let mut name = to_pascal_case(&spaced);
    if name.is_empty() {
        return None;
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, 'R');
    }
    if is_rust_keyword(&name) {
        name.push('_');
    }
    Some(name)
}

/// Struct field name for a property: snake case, keywords escaped.
pub fn field_name(property: &str) -> String {
    let mut name: String = to_snake_case(property)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if NON_RAW.contains(&name.as_str()) {
        name.push('_');
    } else if is_rust_keyword(&name) {
        name.insert_str(0, "r#");
    }
    name
}

/// Allocates unique identifiers within one generated module tree.
///
/// Top-level names are claimed first and never renamed; derived names get a
/// numeric discriminator on collision.
#[derive(Debug, Default)]
pub struct NameTable {
    taken: HashSet<String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` as-is. Returns `false` if it was already taken.
    pub fn claim(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Claim `base`, or `base2`, `base3`, ... if taken.
    pub fn derive(&mut self, base: &str) -> String {
        if self.claim(base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.claim(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_name() {
        assert_eq!(declaration_name("DataBucket").as_deref(), Some("DataBucket"));
        assert_eq!(declaration_name("dataBucket").as_deref(), Some("DataBucket"));
        assert_eq!(declaration_name("my-bucket.v2").as_deref(), Some("MyBucketV2"));
        assert_eq!(declaration_name("3Tier").as_deref(), Some("R3Tier"));
        assert_eq!(declaration_name("self").as_deref(), Some("Self_"));
        assert_eq!(declaration_name("--"), None);
    }

    #[test]
    fn test_field_name() {
        assert_eq!(field_name("BucketName"), "bucket_name");
        assert_eq!(field_name("Type"), "r#type");
        assert_eq!(field_name("Self"), "self_");
        assert_eq!(field_name("VPCId"), "vpc_id");
        assert_eq!(field_name("3DSetting"), "_3d_setting");
    }

    #[test]
    fn test_name_table() {
        let mut names = NameTable::new();
        assert!(names.claim("Bucket"));
        assert!(!names.claim("Bucket"));
        assert_eq!(names.derive("Bucket"), "Bucket2");
        assert_eq!(names.derive("Bucket"), "Bucket3");
        assert_eq!(names.derive("Queue"), "Queue");
    }
}
